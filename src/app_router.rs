//! Hash-based routing. The route grammar mirrors the page set:
//! `#/login`, `#/signup`, `#/{userType}/capsule-box/{jarId}` and
//! `#/{userType}/write/{jarId}/{normal|reply}/{step}[/{capsuleId}]`,
//! with the splash page as the fallback for everything else.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UserType {
    Master,
    Guest,
}

impl UserType {
    pub(crate) fn as_segment(self) -> &'static str {
        match self {
            UserType::Master => "master",
            UserType::Guest => "guest",
        }
    }

    fn parse(segment: &str) -> Self {
        if segment.eq_ignore_ascii_case("master") {
            UserType::Master
        } else {
            UserType::Guest
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriteKind {
    Normal,
    Reply,
}

impl WriteKind {
    fn as_segment(self) -> &'static str {
        match self {
            WriteKind::Normal => "normal",
            WriteKind::Reply => "reply",
        }
    }

    fn parse(segment: &str) -> Self {
        if segment.eq_ignore_ascii_case("reply") {
            WriteKind::Reply
        } else {
            WriteKind::Normal
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Route {
    Splash,
    Login,
    Signup,
    Jar {
        user_type: UserType,
        jar_id: String,
    },
    Write {
        user_type: UserType,
        jar_id: String,
        kind: WriteKind,
        step: u8,
        capsule_id: Option<String>,
    },
}

impl Route {
    pub(crate) fn to_hash(&self) -> String {
        match self {
            Route::Splash => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::Jar { user_type, jar_id } => {
                format!("/{}/capsule-box/{jar_id}", user_type.as_segment())
            }
            Route::Write {
                user_type,
                jar_id,
                kind,
                step,
                capsule_id,
            } => {
                let mut hash = format!(
                    "/{}/write/{jar_id}/{}/{step}",
                    user_type.as_segment(),
                    kind.as_segment()
                );
                if let Some(capsule_id) = capsule_id {
                    hash.push('/');
                    hash.push_str(capsule_id);
                }
                hash
            }
        }
    }
}

pub(crate) fn parse_route(hash: &str) -> Route {
    let raw = hash.trim().trim_start_matches('#').trim_start_matches('/');
    if raw.is_empty() {
        return Route::Splash;
    }
    let segments: Vec<&str> = raw
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    match segments.as_slice() {
        ["login"] => Route::Login,
        ["signup"] => Route::Signup,
        [user_type, "capsule-box", jar_id] => Route::Jar {
            user_type: UserType::parse(user_type),
            jar_id: (*jar_id).to_string(),
        },
        [user_type, "write", jar_id, kind, step, rest @ ..] if rest.len() <= 1 => Route::Write {
            user_type: UserType::parse(user_type),
            jar_id: (*jar_id).to_string(),
            kind: WriteKind::parse(kind),
            step: step.parse().unwrap_or(1),
            capsule_id: rest.first().map(|capsule_id| (*capsule_id).to_string()),
        },
        _ => Route::Splash,
    }
}

pub(crate) fn current_route() -> Route {
    let Some(window) = web_sys::window() else {
        return Route::Splash;
    };
    let hash = window.location().hash().unwrap_or_default();
    parse_route(&hash)
}

pub(crate) fn navigate(route: &Route) {
    let Some(window) = web_sys::window() else {
        return;
    };
    // set_hash fires hashchange, which the app shell listens for.
    let _ = window.location().set_hash(&route.to_hash());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_unknown_hashes_fall_back_to_splash() {
        assert_eq!(parse_route(""), Route::Splash);
        assert_eq!(parse_route("#/"), Route::Splash);
        assert_eq!(parse_route("#/no-such-page"), Route::Splash);
        assert_eq!(parse_route("#/master/unknown/j1"), Route::Splash);
    }

    #[test]
    fn static_pages_parse() {
        assert_eq!(parse_route("#/login"), Route::Login);
        assert_eq!(parse_route("#/signup"), Route::Signup);
    }

    #[test]
    fn jar_route_round_trips() {
        let route = Route::Jar {
            user_type: UserType::Master,
            jar_id: "j1".to_string(),
        };
        assert_eq!(parse_route(&format!("#{}", route.to_hash())), route);
        assert_eq!(
            parse_route("#/guest/capsule-box/j9"),
            Route::Jar {
                user_type: UserType::Guest,
                jar_id: "j9".to_string(),
            }
        );
    }

    #[test]
    fn unknown_user_type_defaults_to_guest() {
        let Route::Jar { user_type, .. } = parse_route("#/visitor/capsule-box/j1") else {
            panic!("expected jar route");
        };
        assert_eq!(user_type, UserType::Guest);
    }

    #[test]
    fn write_route_carries_step_and_optional_capsule() {
        let normal = parse_route("#/master/write/j1/normal/2");
        assert_eq!(
            normal,
            Route::Write {
                user_type: UserType::Master,
                jar_id: "j1".to_string(),
                kind: WriteKind::Normal,
                step: 2,
                capsule_id: None,
            }
        );
        let reply = parse_route("#/guest/write/j1/reply/1/c42");
        assert_eq!(
            reply,
            Route::Write {
                user_type: UserType::Guest,
                jar_id: "j1".to_string(),
                kind: WriteKind::Reply,
                step: 1,
                capsule_id: Some("c42".to_string()),
            }
        );
        assert_eq!(reply.to_hash(), "/guest/write/j1/reply/1/c42");
    }

    #[test]
    fn bad_step_segment_defaults_to_one() {
        let Route::Write { step, .. } = parse_route("#/master/write/j1/normal/first") else {
            panic!("expected write route");
        };
        assert_eq!(step, 1);
    }
}
