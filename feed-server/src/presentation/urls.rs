use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

// Characters a username may contain besides letters and digits.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+');

// `next` keeps its slashes so the login page shows a readable path.
const NEXT_PARAM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

#[cfg(test)]
pub fn index_url() -> String {
    "/".to_string()
}

#[cfg(test)]
pub fn group_url(slug: &str) -> String {
    format!("/group/{}/", utf8_percent_encode(slug, PATH_SEGMENT))
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, PATH_SEGMENT))
}

pub fn post_detail_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

#[cfg(test)]
pub fn post_edit_url(post_id: i64) -> String {
    format!("/posts/{}/edit/", post_id)
}

#[cfg(test)]
pub fn post_create_url() -> String {
    "/create/".to_string()
}

/// Login page URL that sends the user back to `next` afterwards.
pub fn login_redirect_url(login_url: &str, next: &str) -> String {
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}next={}",
        login_url,
        separator,
        utf8_percent_encode(next, NEXT_PARAM)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_page_urls() {
        assert_eq!(index_url(), "/");
        assert_eq!(group_url("test_slug"), "/group/test_slug/");
        assert_eq!(profile_url("TestUser"), "/profile/TestUser/");
        assert_eq!(profile_url("a.b@c+d-e"), "/profile/a.b@c+d-e/");
        assert_eq!(post_detail_url(5), "/posts/5/");
        assert_eq!(post_edit_url(5), "/posts/5/edit/");
        assert_eq!(post_create_url(), "/create/");
    }

    #[test]
    fn escapes_unsafe_path_characters() {
        assert_eq!(profile_url("a b/c"), "/profile/a%20b%2Fc/");
    }

    #[test]
    fn login_redirect_keeps_slashes() {
        assert_eq!(
            login_redirect_url("/auth/login/", "/create/"),
            "/auth/login/?next=/create/"
        );
        assert_eq!(
            login_redirect_url("/auth/login/", "/posts/1/edit/?x=1"),
            "/auth/login/?next=/posts/1/edit/%3Fx%3D1"
        );
        assert_eq!(
            login_redirect_url("/login?lang=ru", "/create/"),
            "/login?lang=ru&next=/create/"
        );
    }
}
