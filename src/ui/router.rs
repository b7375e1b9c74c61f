//! 路由：路径解析与登录守卫

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Auth,
    Dashboard,
    Product(String),
    Simulation,
}

impl Route {
    /// 解析路径；`/`、`/auth` 与无法匹配的路径都落到 Auth，`/products/` 不带 id 回到 Dashboard
    pub fn parse(path: &str) -> Route {
        let path = path.trim();
        match path {
            "/products" | "/products/" => return Route::Dashboard,
            _ => {}
        }
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "/dashboard" => Route::Dashboard,
            "/simulation" => Route::Simulation,
            _ => match trimmed.strip_prefix("/products/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::Product(id.to_string()),
                _ => Route::Auth,
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Auth => "/auth".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Product(id) => format!("/products/{}", id),
            Route::Simulation => "/simulation".to_string(),
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::Dashboard | Route::Product(_))
    }

    /// 未登录访问受保护页 → Auth；已登录访问 Auth → Dashboard
    pub fn guard(self, authenticated: bool) -> Route {
        match self {
            r if r.requires_auth() && !authenticated => Route::Auth,
            Route::Auth if authenticated => Route::Dashboard,
            r => r,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// 解析并应用守卫
pub fn resolve(path: &str, authenticated: bool) -> Route {
    Route::parse(path).guard(authenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Route::Auth);
        assert_eq!(Route::parse("/auth"), Route::Auth);
        assert_eq!(Route::parse("/dashboard"), Route::Dashboard);
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse("/products/6"), Route::Product("6".into()));
        assert_eq!(Route::parse("/products/"), Route::Dashboard);
        assert_eq!(Route::parse("/products"), Route::Dashboard);
        assert_eq!(Route::parse("/simulation"), Route::Simulation);
        assert_eq!(Route::parse("/no/such/page"), Route::Auth);
        assert_eq!(Route::parse("/products/6/extra"), Route::Auth);
    }

    #[test]
    fn test_guards() {
        assert_eq!(resolve("/dashboard", false), Route::Auth);
        assert_eq!(resolve("/products/1", false), Route::Auth);
        assert_eq!(resolve("/auth", true), Route::Dashboard);
        assert_eq!(resolve("/", true), Route::Dashboard);
        assert_eq!(resolve("/simulation", false), Route::Simulation);
        assert_eq!(resolve("/products/1", true), Route::Product("1".into()));
    }

    #[test]
    fn test_path_round_trip() {
        for route in [Route::Auth, Route::Dashboard, Route::Product("7".into()), Route::Simulation] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }
}
