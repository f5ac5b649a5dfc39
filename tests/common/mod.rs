//! In-process stand-in for the Story Spoiler API.

use actix_web::dev::Payload;
use actix_web::{
    http, web, App, Error as ActixError, FromRequest, HttpRequest, HttpResponse, HttpServer,
    Responder,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use story_spoiler::Settings;
use uuid::Uuid;

pub const EMAIL: &str = "reader@example.com";
pub const PASSWORD: &str = "123456";

const SECRET: &[u8] = b"story-spoiler-test-secret";

#[derive(Debug, Clone, Serialize)]
pub struct StoredStory {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Switches that make the stand-in misbehave in specific ways.
#[derive(Debug, Default, Clone)]
pub struct Behavior {
    pub omit_access_token: bool,
    pub omit_created_id: bool,
    pub hide_stories: bool,
    pub malformed_list: bool,
    /// Lists stories with their ids only.
    pub strip_titles: bool,
    /// Replaces the `msg` Create answers with.
    pub created_msg: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    pub stories: RwLock<Vec<StoredStory>>,
    pub behavior: RwLock<Behavior>,
    pub login_calls: AtomicUsize,
    pub rejected_calls: AtomicUsize,
}

impl MockState {
    pub fn login_count(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected_calls.load(Ordering::SeqCst)
    }

    pub fn story_ids(&self) -> Vec<String> {
        self.stories.read().unwrap().iter().map(|s| s.id.clone()).collect()
    }

    pub fn set_behavior(&self, behavior: Behavior) {
        *self.behavior.write().unwrap() = behavior;
    }

    pub fn seed_story(&self, id: &str, title: &str) {
        self.stories.write().unwrap().push(StoredStory {
            id: id.to_string(),
            title: title.to_string(),
            description: "Seeded before the run".to_string(),
            url: String::new(),
        });
    }
}

pub struct TestApp {
    pub address: String,
    pub state: web::Data<MockState>,
}

#[allow(dead_code)]
impl TestApp {
    pub fn login_settings(&self) -> Settings {
        Settings::new(&self.address)
            .expect("Failed to parse mock address")
            .with_login(EMAIL, PASSWORD)
    }

    pub fn token_settings(&self, token: &str) -> Settings {
        Settings::new(&self.address)
            .expect("Failed to parse mock address")
            .with_token(token)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(Behavior::default()).await
}

pub async fn spawn_app_with(behavior: Behavior) -> TestApp {
    spawn_app_under("", behavior).await
}

/// Serves every route below `prefix`, the way a gateway in front of the API would.
pub async fn spawn_app_under(prefix: &str, behavior: Behavior) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let state = web::Data::new(MockState::default());
    state.set_behavior(behavior);

    let data = state.clone();
    let prefix = prefix.to_string();
    let server = HttpServer::new(move || {
        let prefix = prefix.clone();
        App::new()
            .app_data(data.clone())
            .configure(move |cfg| mount(cfg, &prefix))
    })
    .workers(1)
    .listen(listener)
    .expect("Failed to bind address")
    .run();
    let _ = tokio::spawn(server);

    TestApp { address, state }
}

fn mount(cfg: &mut web::ServiceConfig, prefix: &str) {
    if prefix.is_empty() {
        routes(cfg);
    } else {
        cfg.service(web::scope(prefix).configure(routes));
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/Users/Authentication", web::post().to(login))
        .service(
            web::scope("/api/Story")
                .route("/Create", web::post().to(create_story))
                .route("/All", web::get().to(list_stories))
                .route("/Edit/{id}", web::put().to(edit_story))
                .route("/Delete/{id}", web::delete().to(delete_story)),
        );
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub fn create_token(email: &str, valid_for: Duration) -> String {
    let claims = Claims {
        sub: email.to_owned(),
        exp: (Utc::now() + valid_for).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET))
        .expect("Failed to sign token")
}

fn decode_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(token, &DecodingKey::from_secret(SECRET), &Validation::default())
        .map(|data| data.claims)
}

/// Extractor that rejects requests without a valid bearer token.
struct Authenticated;

impl FromRequest for Authenticated {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        if let Some(token) = token {
            if decode_token(token).is_ok() {
                return ready(Ok(Authenticated));
            }
        }

        if let Some(state) = req.app_data::<web::Data<MockState>>() {
            state.rejected_calls.fetch_add(1, Ordering::SeqCst);
        }
        ready(Err(actix_web::error::ErrorUnauthorized("Invalid or missing token")))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    login_email: String,
    login_password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StoryBody {
    title: String,
    description: String,
    #[serde(default)]
    url: String,
}

fn msg(text: &str) -> serde_json::Value {
    serde_json::json!({ "msg": text })
}

async fn login(data: web::Data<MockState>, req: web::Json<LoginBody>) -> impl Responder {
    data.login_calls.fetch_add(1, Ordering::SeqCst);

    if req.login_email != EMAIL || req.login_password != PASSWORD {
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let behavior = data.behavior.read().unwrap().clone();
    if behavior.omit_access_token {
        return HttpResponse::Ok().json(serde_json::json!({ "email": req.login_email }));
    }

    HttpResponse::Ok().json(serde_json::json!({
        "accessToken": create_token(&req.login_email, Duration::hours(1)),
        "email": req.login_email,
    }))
}

async fn create_story(
    data: web::Data<MockState>,
    req: web::Json<StoryBody>,
    _: Authenticated,
) -> impl Responder {
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "errors": { "Title": ["The Title field is required."] }
        }));
    }

    let story = StoredStory {
        id: Uuid::new_v4().to_string(),
        title: req.title.clone(),
        description: req.description.clone(),
        url: req.url.clone(),
    };
    let id = story.id.clone();
    data.stories.write().unwrap().push(story);

    let behavior = data.behavior.read().unwrap().clone();
    let created_msg = behavior.created_msg.as_deref().unwrap_or("Successfully created!");
    if behavior.omit_created_id {
        return HttpResponse::Created().json(msg(created_msg));
    }
    HttpResponse::Created().json(serde_json::json!({ "msg": created_msg, "id": id }))
}

async fn list_stories(data: web::Data<MockState>, _: Authenticated) -> impl Responder {
    let behavior = data.behavior.read().unwrap().clone();
    if behavior.malformed_list {
        return HttpResponse::Ok().content_type("text/html").body("<html>maintenance</html>");
    }
    if behavior.hide_stories {
        return HttpResponse::Ok().json(Vec::<StoredStory>::new());
    }
    let stories = data.stories.read().unwrap().clone();
    if behavior.strip_titles {
        let ids: Vec<_> = stories
            .iter()
            .map(|s| serde_json::json!({ "id": s.id }))
            .collect();
        return HttpResponse::Ok().json(ids);
    }
    HttpResponse::Ok().json(stories)
}

async fn edit_story(
    data: web::Data<MockState>,
    path: web::Path<String>,
    req: web::Json<StoryBody>,
    _: Authenticated,
) -> impl Responder {
    let id = path.into_inner();
    let mut stories = data.stories.write().unwrap();
    match stories.iter_mut().find(|s| s.id == id) {
        Some(story) => {
            story.title = req.title.clone();
            story.description = req.description.clone();
            story.url = req.url.clone();
            HttpResponse::Ok().json(msg("Successfully edited"))
        }
        None => HttpResponse::NotFound().json(msg("No spoilers...")),
    }
}

async fn delete_story(
    data: web::Data<MockState>,
    path: web::Path<String>,
    _: Authenticated,
) -> impl Responder {
    let id = path.into_inner();
    let mut stories = data.stories.write().unwrap();
    let before = stories.len();
    stories.retain(|s| s.id != id);
    if stories.len() == before {
        HttpResponse::BadRequest().json(msg("Unable to delete this story spoiler!"))
    } else {
        HttpResponse::Ok().json(msg("Deleted successfully!"))
    }
}
