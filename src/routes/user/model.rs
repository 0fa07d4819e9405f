use serde::{Deserialize, Serialize};

use crate::database::UserChanges;
use crate::error::AppError;

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 255;

/// 用户列表查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

impl ListUsersQuery {
    /// 去掉首尾空白后的搜索词，空串视为未提供
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
    }
}

/// 创建/更新用户请求体
#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserRequest {
    /// 校验请求并转换为写入字段
    pub fn validate(self) -> Result<UserChanges, AppError> {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        let email = self.email.trim().to_string();

        if first_name.is_empty() || first_name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::Validation(format!(
                "first_name 长度必须在1到{}个字符之间",
                MAX_NAME_LEN
            )));
        }
        if last_name.is_empty() || last_name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::Validation(format!(
                "last_name 长度必须在1到{}个字符之间",
                MAX_NAME_LEN
            )));
        }
        if email.len() > MAX_EMAIL_LEN || !is_email(&email) {
            return Err(AppError::Validation("email 格式无效".to_string()));
        }

        Ok(UserChanges {
            first_name,
            last_name,
            email,
        })
    }
}

fn is_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(first: &str, last: &str, email: &str) -> UserRequest {
        UserRequest {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
        }
    }

    #[test]
    fn valid_request_is_trimmed() {
        let changes = request(" Ann ", "Lee", "ann@example.com ").validate().unwrap();
        assert_eq!(changes.first_name, "Ann");
        assert_eq!(changes.email, "ann@example.com");
    }

    #[test]
    fn empty_names_are_rejected() {
        assert!(matches!(
            request("  ", "Lee", "ann@example.com").validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            request("Ann", "", "ann@example.com").validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "ann", "@example.com", "ann@", "ann@example", "a b@example.com", "a@b@c.com"] {
            assert!(
                request("Ann", "Lee", email).validate().is_err(),
                "{email} should be rejected"
            );
        }
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = ListUsersQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);
    }
}
