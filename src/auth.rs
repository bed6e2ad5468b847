use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};

pub const SESSION_COOKIE: &str = "showcase_session";

/// Guard for admin routes: the operator's upstream bearer token, held in an
/// encrypted private cookie. Whether the token is still accepted is only
/// known once the API answers; a 401 there ends the session.
pub struct OperatorSession {
    pub token: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for OperatorSession {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let cookies = request.cookies();
        match cookies.get_private(SESSION_COOKIE) {
            Some(c) if !c.value().is_empty() => Outcome::Success(OperatorSession {
                token: c.value().to_string(),
            }),
            Some(_) => {
                cookies.remove_private(Cookie::from(SESSION_COOKIE));
                Outcome::Forward(Status::Unauthorized)
            }
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

pub fn set_session_cookie(cookies: &CookieJar<'_>, token: &str) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}
