// 服务层
// 处理器通过服务访问数据库，服务的读操作作为缓存的回源函数

pub mod user;

pub use user::UserService;
