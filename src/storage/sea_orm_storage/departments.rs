use super::{SeaOrmStorage, db_err, is_unique_violation};
use crate::entity::{departments, institutes};
use crate::errors::{ETenderError, Result};
use crate::models::departments::{entities::Department, requests::NewDepartment};
use crate::models::users::entities::Institute;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 创建部门
    pub async fn create_department_impl(
        &self,
        department: NewDepartment,
        now: DateTime<Utc>,
    ) -> Result<Department> {
        let model = departments::ActiveModel {
            institute_id: Set(department.institute_id),
            department_name: Set(department.department_name),
            username: Set(department.username),
            password_hash: Set(department.password_hash),
            head_of_department: Set(department.head_of_department),
            created_at: Set(now.timestamp()),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                ETenderError::conflict("Department name or username already exists")
            } else {
                ETenderError::database_operation(format!("创建部门失败: {e}"))
            }
        })?;

        Ok(result.into_department())
    }

    pub async fn get_department_by_id_impl(&self, dept_id: i64) -> Result<Option<Department>> {
        let result = departments::Entity::find_by_id(dept_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询部门失败"))?;

        Ok(result.map(|m| m.into_department()))
    }

    pub async fn get_department_by_username_impl(
        &self,
        username: &str,
    ) -> Result<Option<Department>> {
        let result = departments::Entity::find()
            .filter(departments::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err("查询部门失败"))?;

        Ok(result.map(|m| m.into_department()))
    }

    pub async fn get_department_by_name_impl(
        &self,
        institute_id: i64,
        department_name: &str,
    ) -> Result<Option<Department>> {
        let result = departments::Entity::find()
            .filter(departments::Column::InstituteId.eq(institute_id))
            .filter(departments::Column::DepartmentName.eq(department_name))
            .one(&self.db)
            .await
            .map_err(db_err("查询部门失败"))?;

        Ok(result.map(|m| m.into_department()))
    }

    /// 列出机构下的全部部门
    pub async fn list_departments_impl(&self, institute_id: i64) -> Result<Vec<Department>> {
        let rows = departments::Entity::find()
            .filter(departments::Column::InstituteId.eq(institute_id))
            .order_by_asc(departments::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("查询部门列表失败"))?;

        Ok(rows.into_iter().map(|m| m.into_department()).collect())
    }

    pub async fn get_institute_by_id_impl(&self, institute_id: i64) -> Result<Option<Institute>> {
        let result = institutes::Entity::find_by_id(institute_id)
            .one(&self.db)
            .await
            .map_err(db_err("查询机构失败"))?;

        Ok(result.map(|m| m.into_institute()))
    }
}
