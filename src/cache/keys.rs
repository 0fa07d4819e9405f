// 缓存键与标签
// 键由操作名加参数拼接而成，相同的查询总是得到相同的键

/// 用户相关缓存的标签
pub const USERS_TAG: &str = "users";

/// 用户分页列表缓存键：`GetUsers_<page>_<limit>[_<search>]`
pub fn users_page_key(page: i64, limit: i64, search: Option<&str>) -> String {
    match search {
        Some(search) if !search.is_empty() => format!("GetUsers_{}_{}_{}", page, limit, search),
        _ => format!("GetUsers_{}_{}", page, limit),
    }
}

/// 单个用户缓存键：`GetUser_<id>`
pub fn user_key(id: i64) -> String {
    format!("GetUser_{}", id)
}
