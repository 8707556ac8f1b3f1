//! Client-side route table and the authentication guard.
//!
//! Views themselves are out of scope; a resolved route names the [`View`]
//! that should render and carries the merged route metadata.

mod navigator;
mod routes;

pub use navigator::{History, Navigator};
pub use routes::{RouteRecord, RouteTarget, default_routes};

use std::collections::BTreeMap;
use tracing::debug;

/// Entry point for unauthenticated users.
pub const LOGIN_PATH: &str = "/login";
/// Query parameter carrying the originally requested location.
pub const REDIRECT_QUERY_KEY: &str = "redirect";
/// Document title used when a route does not set one.
pub const DEFAULT_TITLE: &str = "RedNote";

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum View {
    PhoneLogin,
    CodeVerify,
    Register,
    Home,
    Recommend,
    Following,
    QuestionBank,
    Publish,
    PublishNote,
    Messages,
    Profile,
    NoteDetail,
    UserProfile,
    QuestionDetail,
    NotFound,
}

/// Per-record metadata. Unset fields inherit from the parent record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    pub requires_auth: Option<bool>,
    pub show_category_nav: Option<bool>,
}

impl RouteMeta {
    fn inherit(self, parent: Self) -> Self {
        Self {
            title: self.title.or(parent.title),
            requires_auth: self.requires_auth.or(parent.requires_auth),
            show_category_nav: self.show_category_nav.or(parent.show_category_nav),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: Option<&'static str>,
    pub view: View,
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    pub title: String,
    pub requires_auth: bool,
    pub show_category_nav: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(ResolvedRoute),
    Redirect { location: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

#[derive(Debug, Clone)]
struct Matcher {
    segments: Vec<Segment>,
    name: Option<&'static str>,
    target: RouteTarget,
    meta: RouteMeta,
}

impl Matcher {
    /// Static routes beat parameterised ones, which beat the catch-all.
    fn rank(&self) -> (bool, usize) {
        let catch_all = self
            .segments
            .iter()
            .any(|segment| matches!(segment, Segment::CatchAll(_)));
        let params = self
            .segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Param(_)))
            .count();
        (catch_all, params)
    }

    fn matches(&self, path_segments: &[&str]) -> Option<BTreeMap<String, String>> {
        let mut params = BTreeMap::new();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::CatchAll(name) => {
                    params.insert(name.clone(), path_segments.get(index..)?.join("/"));
                    return Some(params);
                }
                Segment::Static(expected) => {
                    if path_segments.get(index) != Some(&expected.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = path_segments.get(index)?;
                    params.insert(name.clone(), (*value).to_string());
                }
            }
        }
        (self.segments.len() == path_segments.len()).then_some(params)
    }
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    split_path(pattern)
        .into_iter()
        .map(|raw| {
            if let Some(param) = raw.strip_prefix(':') {
                match param.split_once('(') {
                    Some((name, _)) => Segment::CatchAll(name.to_string()),
                    None => Segment::Param(param.to_string()),
                }
            } else {
                Segment::Static(raw.to_string())
            }
        })
        .collect()
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

fn join_child(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_string()
    } else {
        format!("{}/{child}", parent.trim_end_matches('/'))
    }
}

pub struct Router {
    matchers: Vec<Matcher>,
}

impl Router {
    pub fn new(records: &[RouteRecord]) -> Self {
        let mut matchers = Vec::new();
        for record in records {
            Self::flatten(record, "", RouteMeta::default(), &mut matchers);
        }
        // Stable sort keeps definition order among equally ranked routes.
        matchers.sort_by_key(Matcher::rank);
        Self { matchers }
    }

    fn flatten(record: &RouteRecord, prefix: &str, parent: RouteMeta, out: &mut Vec<Matcher>) {
        let path = join_child(prefix, record.path);
        let meta = record.meta.inherit(parent);
        out.push(Matcher {
            segments: parse_pattern(&path),
            name: record.name,
            target: record.target,
            meta,
        });
        for child in &record.children {
            Self::flatten(child, &path, meta, out);
        }
    }

    /// Resolves `full_path` (path plus optional query) for a client that
    /// does or does not hold a session token.
    pub fn resolve(&self, full_path: &str, authenticated: bool) -> Resolution {
        let mut current = full_path.trim().to_string();
        if !current.starts_with('/') {
            current.insert(0, '/');
        }

        for _ in 0..MAX_REDIRECTS {
            let path = current.split_once('?').map_or(current.as_str(), |(path, _)| path);
            let segments = split_path(path);

            let Some((matcher, params)) = self
                .matchers
                .iter()
                .find_map(|matcher| matcher.matches(&segments).map(|params| (matcher, params)))
            else {
                break;
            };

            let view = match matcher.target {
                RouteTarget::Redirect(to) => {
                    debug!(from = %current, to = %to, "route.redirect");
                    current = to.to_string();
                    continue;
                }
                RouteTarget::View(view) => view,
            };

            let requires_auth = matcher.meta.requires_auth.unwrap_or(false);
            if requires_auth && !authenticated {
                debug!(path = %current, "route.guard.blocked");
                return Resolution::Redirect {
                    location: login_redirect(&current),
                };
            }

            return Resolution::Render(ResolvedRoute {
                name: matcher.name,
                view,
                full_path: current,
                params,
                title: matcher.meta.title.unwrap_or(DEFAULT_TITLE).to_string(),
                requires_auth,
                show_category_nav: matcher.meta.show_category_nav.unwrap_or(false),
            });
        }

        Resolution::Render(ResolvedRoute {
            name: None,
            view: View::NotFound,
            full_path: current,
            params: BTreeMap::new(),
            title: DEFAULT_TITLE.to_string(),
            requires_auth: false,
            show_category_nav: false,
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(&default_routes())
    }
}

/// `/login?redirect=<full_path>`, with the destination form-encoded.
pub fn login_redirect(full_path: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(REDIRECT_QUERY_KEY, full_path)
        .finish();
    format!("{LOGIN_PATH}?{query}")
}
