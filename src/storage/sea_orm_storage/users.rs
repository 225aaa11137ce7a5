use super::{SeaOrmStorage, db_err, is_unique_violation};
use crate::entity::{institutes, roles, user_roles, users, vendors};
use crate::errors::{ETenderError, Result};
use crate::models::auth::requests::{NewSignup, SignupProfile};
use crate::models::users::entities::{RoleName, User, UserWithProfile, VerificationStatus};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

/// 读取用户的角色名
pub(super) async fn load_roles<C: ConnectionTrait>(db: &C, user_id: i64) -> Result<Vec<RoleName>> {
    let rows = roles::Entity::find()
        .inner_join(user_roles::Entity)
        .filter(user_roles::Column::UserId.eq(user_id))
        .all(db)
        .await
        .map_err(db_err("查询用户角色失败"))?;

    Ok(rows
        .into_iter()
        .filter_map(|r| r.name.parse::<RoleName>().ok())
        .collect())
}

impl SeaOrmStorage {
    async fn hydrate_user(&self, model: Option<users::Model>) -> Result<Option<User>> {
        match model {
            Some(m) => {
                let roles = load_roles(&self.db, m.id).await?;
                Ok(Some(m.into_user(roles)))
            }
            None => Ok(None),
        }
    }

    /// 注册用户：用户、角色关联和档案在一个事务内写入
    pub async fn signup_impl(
        &self,
        signup: NewSignup,
        now: DateTime<Utc>,
    ) -> Result<UserWithProfile> {
        let ts = now.timestamp();
        let txn = self.db.begin().await.map_err(db_err("开启事务失败"))?;

        let role = roles::Entity::find()
            .filter(roles::Column::Name.eq(signup.role.as_str()))
            .one(&txn)
            .await
            .map_err(db_err("查询角色失败"))?
            .ok_or_else(|| {
                ETenderError::internal(format!("Role {} is not seeded", signup.role))
            })?;

        let user = users::ActiveModel {
            username: Set(signup.username.clone()),
            email: Set(signup.email.clone()),
            password_hash: Set(signup.password_hash),
            created_at: Set(ts),
            updated_at: Set(ts),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ETenderError::conflict("Username or email already registered")
            } else {
                ETenderError::database_operation(format!("创建用户失败: {e}"))
            }
        })?;

        user_roles::ActiveModel {
            user_id: Set(user.id),
            role_id: Set(role.id),
        }
        .insert(&txn)
        .await
        .map_err(db_err("关联用户角色失败"))?;

        let pending = VerificationStatus::Pending.to_string();
        let (vendor, institute) = match signup.profile {
            SignupProfile::Vendor {
                company_name,
                registration_number,
                gst_number,
                address,
            } => {
                let vendor = vendors::ActiveModel {
                    user_id: Set(user.id),
                    company_name: Set(company_name),
                    registration_number: Set(registration_number),
                    gst_number: Set(gst_number),
                    address: Set(address),
                    verification_status: Set(pending),
                    created_at: Set(ts),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(db_err("创建供应商档案失败"))?;
                (Some(vendor.into_vendor()), None)
            }
            SignupProfile::Institute {
                institute_name,
                contact_email,
                contact_phone,
                address,
            } => {
                let institute = institutes::ActiveModel {
                    user_id: Set(user.id),
                    institute_name: Set(institute_name),
                    contact_email: Set(contact_email),
                    contact_phone: Set(contact_phone),
                    address: Set(address),
                    verification_status: Set(pending),
                    created_at: Set(ts),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(db_err("创建机构档案失败"))?;
                (None, Some(institute.into_institute()))
            }
        };

        txn.commit().await.map_err(db_err("提交注册事务失败"))?;

        info!("User {} registered with role {}", user.username, signup.role);

        Ok(UserWithProfile {
            user: user.into_user(vec![signup.role]),
            vendor,
            institute,
        })
    }

    /// 通过用户名获取用户
    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        self.hydrate_user(model).await
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        self.hydrate_user(model).await
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let model = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(identifier))
                    .add(users::Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        self.hydrate_user(model).await
    }

    /// 用户及其档案
    pub async fn get_user_profile_impl(&self, user_id: i64) -> Result<Option<UserWithProfile>> {
        let model = users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询用户失败"))?;

        let Some(user) = self.hydrate_user(model).await? else {
            return Ok(None);
        };

        let vendor = vendors::Entity::find()
            .filter(vendors::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询供应商档案失败"))?
            .map(|m| m.into_vendor());

        let institute = institutes::Entity::find()
            .filter(institutes::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_err("查询机构档案失败"))?
            .map(|m| m.into_institute());

        Ok(Some(UserWithProfile {
            user,
            vendor,
            institute,
        }))
    }
}
