use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::{ACCESS_TOKEN_COOKIE, Config, REFRESH_TOKEN_COOKIE};

/// HttpOnly, SameSite=Strict, `Secure` unless running in debug mode.
fn token_cookie(name: &'static str, value: String, max_age_secs: i64, config: &Config) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(!config.debug)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

pub fn set_access_cookie(jar: CookieJar, token: String, config: &Config) -> CookieJar {
    jar.add(token_cookie(
        ACCESS_TOKEN_COOKIE,
        token,
        config.access_token_lifetime_secs,
        config,
    ))
}

pub fn set_refresh_cookie(jar: CookieJar, token: String, config: &Config) -> CookieJar {
    jar.add(token_cookie(
        REFRESH_TOKEN_COOKIE,
        token,
        config.refresh_token_lifetime_secs,
        config,
    ))
}

pub fn clear_token_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"))
}
