use super::{RouteMeta, View};

/// Target of a route record: either a view or a static redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(View),
    Redirect(&'static str),
}

#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub target: RouteTarget,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    fn view(path: &'static str, name: &'static str, view: View, meta: RouteMeta) -> Self {
        Self {
            path,
            name: Some(name),
            target: RouteTarget::View(view),
            meta,
            children: Vec::new(),
        }
    }

    fn redirect(path: &'static str, to: &'static str) -> Self {
        Self {
            path,
            name: None,
            target: RouteTarget::Redirect(to),
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }
}

fn titled(title: &'static str) -> RouteMeta {
    RouteMeta {
        title: Some(title),
        ..RouteMeta::default()
    }
}

fn guarded(title: &'static str, show_category_nav: bool) -> RouteMeta {
    RouteMeta {
        title: Some(title),
        requires_auth: Some(true),
        show_category_nav: Some(show_category_nav),
    }
}

fn category(path: &'static str, name: &'static str, title: &'static str) -> RouteRecord {
    RouteRecord::view(path, name, View::Home, guarded(title, true))
}

/// The application's route table, in definition order.
pub fn default_routes() -> Vec<RouteRecord> {
    vec![
        RouteRecord::redirect("/", "/home/questionbank"),
        RouteRecord::view("/login", "Login", View::PhoneLogin, titled("Log in - RedNote")),
        RouteRecord::view(
            "/login/code",
            "CodeVerify",
            View::CodeVerify,
            titled("Verify code - RedNote"),
        ),
        RouteRecord::view("/register", "Register", View::Register, titled("Register - RedNote")),
        RouteRecord {
            path: "/home",
            name: None,
            target: RouteTarget::View(View::Home),
            meta: guarded("Home - RedNote", true),
            children: vec![
                RouteRecord::view("recommend", "recommend", View::Recommend, RouteMeta::default()),
                RouteRecord::view("following", "following", View::Following, RouteMeta::default()),
                RouteRecord::view(
                    "questionbank",
                    "questionbank",
                    View::QuestionBank,
                    RouteMeta::default(),
                ),
            ],
        },
        category("/food", "Food", "Food - RedNote"),
        category("/beauty", "Beauty", "Beauty - RedNote"),
        category("/movie", "Movie", "Movies - RedNote"),
        category("/career", "Career", "Career - RedNote"),
        category("/emotion", "Emotion", "Relationships - RedNote"),
        // Shadowed by the first `/home` record; kept so the table matches the app.
        category("/home", "HomeDecor", "Home decor - RedNote"),
        category("/game", "Game", "Games - RedNote"),
        category("/travel", "Travel", "Travel - RedNote"),
        category("/fitness", "Fitness", "Fitness - RedNote"),
        RouteRecord::view(
            "/publish",
            "Publish",
            View::Publish,
            guarded("Publish note - RedNote", false),
        ),
        RouteRecord::view(
            "/publish/note",
            "PublishNote",
            View::PublishNote,
            guarded("Publish note - RedNote", false),
        ),
        RouteRecord::view(
            "/messages",
            "Messages",
            View::Messages,
            guarded("Messages - RedNote", false),
        ),
        RouteRecord::view(
            "/profile",
            "Profile",
            View::Profile,
            guarded("Profile - RedNote", false),
        ),
        RouteRecord::view(
            "/note/:id",
            "noteDetail",
            View::NoteDetail,
            guarded("Note - RedNote", false),
        ),
        RouteRecord::view(
            "/user/:id",
            "UserProfile",
            View::UserProfile,
            guarded("User - RedNote", false),
        ),
        RouteRecord::view(
            "/question/:id",
            "questionDetail",
            View::QuestionDetail,
            guarded("Question detail", false),
        ),
        RouteRecord::view(
            "/:pathMatch(.*)*",
            "NotFound",
            View::NotFound,
            titled("Page not found - RedNote"),
        ),
    ]
}
