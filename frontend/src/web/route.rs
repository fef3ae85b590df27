//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、它们的访问要求，以及导航守卫的判定规则。

use std::fmt::Display;

use crate::auth::AdminCheck;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (默认路由)
    #[default]
    Login,
    Register,
    /// 首页概览
    Home,
    Tasks,
    TaskCreate,
    TaskDetail(i64),
    TaskEdit(i64),
    /// 回收站
    Trash,
    Settings,
    ThemeSettings,
    Statistics,
    Categories,
    Reminders,
    /// 单个任务的提醒
    TaskReminders(i64),
    Comments,
    /// 用户管理 (需要管理员)
    AdminUsers,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 忽略末尾的 `/`，路径参数必须是整数。
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        fn id(s: &str) -> Option<i64> {
            s.parse().ok()
        }

        match segments.as_slice() {
            [] | ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["home"] => Self::Home,
            ["tasks"] => Self::Tasks,
            ["tasks", "create"] => Self::TaskCreate,
            ["tasks", task_id] => id(task_id).map_or(Self::NotFound, Self::TaskDetail),
            ["tasks", task_id, "edit"] => id(task_id).map_or(Self::NotFound, Self::TaskEdit),
            ["trash"] => Self::Trash,
            ["settings"] => Self::Settings,
            ["settings", "theme"] => Self::ThemeSettings,
            ["statistics"] => Self::Statistics,
            ["categories"] => Self::Categories,
            ["reminders"] => Self::Reminders,
            ["reminders", "tasks", task_id] => {
                id(task_id).map_or(Self::NotFound, Self::TaskReminders)
            }
            ["comments"] => Self::Comments,
            ["admin", "users"] => Self::AdminUsers,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".into(),
            Self::Register => "/register".into(),
            Self::Home => "/home".into(),
            Self::Tasks => "/tasks".into(),
            Self::TaskCreate => "/tasks/create".into(),
            Self::TaskDetail(id) => format!("/tasks/{}", id),
            Self::TaskEdit(id) => format!("/tasks/{}/edit", id),
            Self::Trash => "/trash".into(),
            Self::Settings => "/settings".into(),
            Self::ThemeSettings => "/settings/theme".into(),
            Self::Statistics => "/statistics".into(),
            Self::Categories => "/categories".into(),
            Self::Reminders => "/reminders".into(),
            Self::TaskReminders(id) => format!("/reminders/tasks/{}", id),
            Self::Comments => "/comments".into(),
            Self::AdminUsers => "/admin/users".into(),
            Self::NotFound => "/404".into(),
        }
    }

    /// 页面标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "登录",
            Self::Register => "注册",
            Self::Home => "首页",
            Self::Tasks => "任务列表",
            Self::TaskCreate => "创建任务",
            Self::TaskDetail(_) => "任务详情",
            Self::TaskEdit(_) => "编辑任务",
            Self::Trash => "回收站",
            Self::Settings => "个人设置",
            Self::ThemeSettings => "主题设置",
            Self::Statistics => "统计",
            Self::Categories => "分类管理",
            Self::Reminders | Self::TaskReminders(_) => "提醒管理",
            Self::Comments => "评论管理",
            Self::AdminUsers => "用户管理",
            Self::NotFound => "页面未找到",
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Self::Login | Self::Register | Self::NotFound)
    }

    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::AdminUsers)
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页），也是权限不足时的去处
    pub fn auth_success_redirect() -> Self {
        Self::Home
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(AppRoute),
    /// 本地标记声称是管理员，需要请求 `/users/me` 确认
    VerifyAdmin,
}

/// 导航守卫
///
/// - `is_authenticated`: 本地是否有令牌
/// - `admin_hint`: 本地存储的管理员标记
pub fn guard(target: &AppRoute, is_authenticated: bool, admin_hint: bool) -> GuardDecision {
    if target.requires_auth() && !is_authenticated {
        return GuardDecision::Redirect(AppRoute::auth_failure_redirect());
    }
    if target.should_redirect_when_authenticated() && is_authenticated {
        return GuardDecision::Redirect(AppRoute::auth_success_redirect());
    }
    if target.requires_admin() {
        return if admin_hint {
            GuardDecision::VerifyAdmin
        } else {
            GuardDecision::Redirect(AppRoute::auth_success_redirect())
        };
    }
    GuardDecision::Allow
}

/// 管理员校验返回后的去处，`None` 表示不再跳转
///
/// - `superseded`: 校验期间已经发生了新的导航
/// - `current`: 校验返回时的当前路由
pub fn after_admin_check(
    target: AppRoute,
    check: &AdminCheck,
    superseded: bool,
    current: &AppRoute,
) -> Option<AppRoute> {
    if superseded {
        return None;
    }
    match check {
        AdminCheck::Granted => Some(target),
        AdminCheck::Denied => Some(AppRoute::auth_success_redirect()),
        // 登出后认证监听可能已经跳到登录页
        AdminCheck::Failed(_) => {
            let login = AppRoute::auth_failure_redirect();
            (*current != login).then_some(login)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn paths_round_trip() {
        let routes = [
            AppRoute::Login,
            AppRoute::Register,
            AppRoute::Home,
            AppRoute::Tasks,
            AppRoute::TaskCreate,
            AppRoute::TaskDetail(7),
            AppRoute::TaskEdit(7),
            AppRoute::Trash,
            AppRoute::Settings,
            AppRoute::ThemeSettings,
            AppRoute::Statistics,
            AppRoute::Categories,
            AppRoute::Reminders,
            AppRoute::TaskReminders(3),
            AppRoute::Comments,
            AppRoute::AdminUsers,
        ];
        for route in routes {
            assert_eq!(AppRoute::from_path(&route.to_path()), route);
        }
    }

    #[test]
    fn root_is_login_and_unknown_is_not_found() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Login);
        assert_eq!(AppRoute::from_path(""), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/tasks/"), AppRoute::Tasks);
        assert_eq!(AppRoute::from_path("/tasks/abc"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/admin"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/nope/deeper"), AppRoute::NotFound);
    }

    #[test]
    fn create_is_not_parsed_as_an_id() {
        assert_eq!(AppRoute::from_path("/tasks/create"), AppRoute::TaskCreate);
        assert_eq!(AppRoute::from_path("/tasks/12/edit"), AppRoute::TaskEdit(12));
    }

    #[test]
    fn protected_routes_need_a_token() {
        assert_eq!(
            guard(&AppRoute::Tasks, false, false),
            GuardDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(
            guard(&AppRoute::AdminUsers, false, true),
            GuardDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(guard(&AppRoute::Tasks, true, false), GuardDecision::Allow);
        assert_eq!(guard(&AppRoute::NotFound, false, false), GuardDecision::Allow);
        assert_eq!(guard(&AppRoute::Register, false, false), GuardDecision::Allow);
    }

    #[test]
    fn admin_route_checks_the_local_flag_first() {
        assert_eq!(
            guard(&AppRoute::AdminUsers, true, false),
            GuardDecision::Redirect(AppRoute::Home)
        );
        assert_eq!(guard(&AppRoute::AdminUsers, true, true), GuardDecision::VerifyAdmin);
    }

    #[test]
    fn signed_in_users_skip_login_and_register() {
        assert_eq!(
            guard(&AppRoute::Login, true, false),
            GuardDecision::Redirect(AppRoute::Home)
        );
        assert_eq!(
            guard(&AppRoute::Register, true, true),
            GuardDecision::Redirect(AppRoute::Home)
        );
    }

    #[test]
    fn admin_check_result_decides_the_route() {
        let target = AppRoute::AdminUsers;
        assert_eq!(
            after_admin_check(target.clone(), &AdminCheck::Granted, false, &AppRoute::Home),
            Some(AppRoute::AdminUsers)
        );
        assert_eq!(
            after_admin_check(target, &AdminCheck::Denied, false, &AppRoute::Home),
            Some(AppRoute::Home)
        );
    }

    #[test]
    fn later_navigation_wins_over_a_pending_admin_check() {
        assert_eq!(
            after_admin_check(AppRoute::AdminUsers, &AdminCheck::Granted, true, &AppRoute::Tasks),
            None
        );
        assert_eq!(
            after_admin_check(AppRoute::AdminUsers, &AdminCheck::Denied, true, &AppRoute::Tasks),
            None
        );
    }

    #[test]
    fn failed_check_goes_to_login_once() {
        let failed = AdminCheck::Failed(ApiError::network("offline"));
        assert_eq!(
            after_admin_check(AppRoute::AdminUsers, &failed, false, &AppRoute::Home),
            Some(AppRoute::Login)
        );
        assert_eq!(
            after_admin_check(AppRoute::AdminUsers, &failed, false, &AppRoute::Login),
            None
        );
    }
}
