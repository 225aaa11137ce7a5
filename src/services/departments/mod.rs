pub mod create;
pub mod current;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::departments::requests::CreateDepartmentRequest;
use crate::storage::Storage;

pub struct DepartmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl DepartmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::app_storage(request),
        }
    }

    // 机构管理员创建部门，返回一次性明文密码
    pub async fn create_department(
        &self,
        request: &HttpRequest,
        create_request: CreateDepartmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_department(self, request, create_request).await
    }

    pub async fn list_departments(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        list::list_departments(self, request).await
    }

    // 当前部门
    pub async fn current_department(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        current::current_department(self, request).await
    }

    // 当前部门所属机构
    pub async fn my_institute(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        current::my_institute(self, request).await
    }
}
