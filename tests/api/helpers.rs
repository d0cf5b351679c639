use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use uuid::Uuid;

use face_embedding_gateway::domain::entities::embedding::Embedding;
use face_embedding_gateway::domain::entities::user::User;
use face_embedding_gateway::ports::embedder_client::{EmbedderClient, EmbedderClientError};
use face_embedding_gateway::ports::user_repository::{UserRepository, UserRepositoryError};
use face_embedding_gateway::ports::vector_repository::{
    validate_vector_insert, VectorRepository, VectorRepositoryError,
};
use face_embedding_gateway::startup::run;
use face_embedding_gateway::telemetry::{get_tracing_subscriber, init_tracing_subscriber};

// Ensures that the `tracing` stack is only initialized once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    // The sink is part of the type returned by `get_tracing_subscriber`,
    // hence the duplicated calls instead of a single assignment.
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_tracing_subscriber(subscriber);
    } else {
        let subscriber =
            get_tracing_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_tracing_subscriber(subscriber);
    };
});

/// What the fake embedder should answer on the next calls.
#[derive(Clone)]
pub enum EmbedderBehaviour {
    Success(Vec<f32>),
    Rejection(String),
    Timeout,
}

/// In-process stand-in for the gRPC embedder, recording its call count.
pub struct FakeEmbedderClient {
    behaviour: Mutex<EmbedderBehaviour>,
    calls: AtomicUsize,
}

impl FakeEmbedderClient {
    fn new() -> Self {
        Self {
            behaviour: Mutex::new(EmbedderBehaviour::Success(vec![0.1; 512])),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_behaviour(&self, behaviour: EmbedderBehaviour) {
        *self.behaviour.lock().unwrap() = behaviour;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbedderClient for FakeEmbedderClient {
    async fn get_embedding(&self, _image: &[u8]) -> Result<Embedding, EmbedderClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behaviour.lock().unwrap().clone() {
            EmbedderBehaviour::Success(vector) => Ok(Embedding::new(vector)),
            EmbedderBehaviour::Rejection(message) => Err(EmbedderClientError::Rejected(message)),
            EmbedderBehaviour::Timeout => {
                Err(EmbedderClientError::Timeout(Duration::from_secs(5)))
            }
        }
    }
}

/// In-process stand-in for the vector store, recording every insert.
pub struct FakeVectorRepository {
    inserts: Mutex<Vec<(String, Vec<f32>)>>,
    failing: AtomicBool,
}

impl FakeVectorRepository {
    fn new() -> Self {
        Self {
            inserts: Mutex::new(vec![]),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn inserts(&self) -> Vec<(String, Vec<f32>)> {
        self.inserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorRepository for FakeVectorRepository {
    async fn store_vector(
        &self,
        object_id: &str,
        embedding: Embedding,
    ) -> Result<(), VectorRepositoryError> {
        // Same pre-I/O invariant check as the Qdrant implementation
        validate_vector_insert(object_id, &embedding)?;

        if self.failing.load(Ordering::SeqCst) {
            return Err(VectorRepositoryError::Backend(
                "vector store unreachable".into(),
            ));
        }

        self.inserts
            .lock()
            .unwrap()
            .push((object_id.to_string(), embedding.into_inner()));
        Ok(())
    }
}

/// In-memory stand-in for the Postgres user repository.
pub struct FakeUserRepository {
    users: Mutex<HashMap<Uuid, User>>,
    failing: AtomicBool,
}

impl FakeUserRepository {
    fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    fn check_backend(&self) -> Result<(), UserRepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(UserRepositoryError::Other(anyhow::anyhow!(
                "database unreachable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        self.check_backend()?;
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        self.check_backend()?;
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), UserRepositoryError> {
        self.check_backend()?;
        self.users.lock().unwrap().remove(&id);
        Ok(())
    }
}

/// A test API client / test suite, wired against recording fakes for the
/// three outbound collaborators.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub embedder_client: Arc<FakeEmbedderClient>,
    pub vector_repository: Arc<FakeVectorRepository>,
    pub user_repository: Arc<FakeUserRepository>,
}

/// Launches the server as a background task
/// When a tokio runtime is shut down all tasks spawned on it are dropped,
/// so there is no clean up logic to avoid leaking resources between test runs.
pub async fn spawn_app() -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    // Port 0 triggers an OS scan for an available port
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let embedder_client = Arc::new(FakeEmbedderClient::new());
    let vector_repository = Arc::new(FakeVectorRepository::new());
    let user_repository = Arc::new(FakeUserRepository::new());

    // Only one actix-web worker is needed for integration tests
    let server = run(
        listener,
        Some(1),
        embedder_client.clone(),
        vector_repository.clone(),
        user_repository.clone(),
    )
    .expect("Failed to build the test server");

    // Launches the application as a background task
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        port,
        embedder_client,
        vector_repository,
        user_repository,
    }
}

/// A multipart form holding a small fake image under the `image` field
pub fn image_upload_form() -> reqwest::multipart::Form {
    let image_part = reqwest::multipart::Part::bytes(vec![0xFF, 0xD8, 0xFF, 0xE0])
        .file_name("face.jpg")
        .mime_str("image/jpeg")
        .unwrap();

    reqwest::multipart::Form::new().part("image", image_part)
}
