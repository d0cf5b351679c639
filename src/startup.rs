use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_multipart::form::MultipartFormConfig;
use actix_web::{
    dev::Server,
    web::{self, Data},
    App, HttpServer,
};
use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tonic::transport::Channel;
use tracing::info;
use tracing_actix_web::TracingLogger;

use crate::{
    configuration::{DatabaseSettings, EmbedderSettings, QdrantSettings, Settings},
    controllers::{create_picture, create_user, delete_user, embed_image, get_user, health_check},
    ports::{
        embedder_client::EmbedderClient,
        user_repository::UserRepository,
        vector_repository::{VectorRepository, VectorRepositoryError},
    },
    repositories::{
        embedding_qdrant_repository::EmbeddingQdrantRepository,
        face_embedder_grpc_client::GrpcFaceEmbedderClient,
        user_postgres_repository::UserPostgresRepository,
    },
};

/// Holds the newly built server, and some useful properties
pub struct Application {
    server: Server,
    port: u16,
}

#[derive(thiserror::Error, Debug)]
pub enum ApplicationBuildError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    GrpcTransportError(#[from] tonic::transport::Error),
    #[error(transparent)]
    VectorRepositoryError(#[from] VectorRepositoryError),
}

impl Application {
    /// Wires every outbound connection and binds the listener.
    /// Startup is all-or-nothing: a failure here aborts the process.
    ///
    /// # Parameters
    /// - nb_workers: number of actix-web workers
    ///   if `None`, the number of available physical CPUs is used as the worker count.
    #[tracing::instrument(name = "Building application", skip(settings))]
    pub async fn build(
        settings: Settings,
        nb_workers: Option<usize>,
    ) -> Result<Self, ApplicationBuildError> {
        let connection_pool = get_connection_pool(&settings.database);
        let user_repository = Arc::new(UserPostgresRepository::new(connection_pool));

        let qdrant_client = get_qdrant_client(&settings.qdrant)?;
        let vector_repository = Arc::new(
            EmbeddingQdrantRepository::try_new(
                qdrant_client,
                &settings.qdrant.collection,
                &settings.qdrant.collection_distance,
                settings.qdrant.collection_vector_size,
            )
            .await?,
        );

        let embedder_channel = get_embedder_channel(&settings.embedder)?;
        let embedder_client = Arc::new(GrpcFaceEmbedderClient::new(
            embedder_channel,
            settings.embedder.request_timeout(),
        ));

        let address = format!(
            "{}:{}",
            settings.application.host, settings.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr().unwrap().port();

        let server = run(
            listener,
            nb_workers,
            embedder_client,
            vector_repository,
            user_repository,
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// This function only returns when the application is stopped
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        info!("Running server ...");
        self.server.await
    }
}

/// listener: the consumer binds their own port
///
/// The ports are taken as trait objects so that tests can run the exact
/// same server against fakes.
///
/// TracingLogger middleware: helps collecting telemetry data.
/// It generates a unique identifier for each incoming request: `request_id`.
pub fn run(
    listener: TcpListener,
    nb_workers: Option<usize>,
    embedder_client: Arc<dyn EmbedderClient>,
    vector_repository: Arc<dyn VectorRepository>,
    user_repository: Arc<dyn UserRepository>,
) -> Result<Server, std::io::Error> {
    // Wraps the shared handles in `actix_web::Data` (`Arc`) to be able to
    // register them and access them from handlers.
    let embedder_client = Data::from(embedder_client);
    let vector_repository = Data::from(vector_repository);
    let user_repository = Data::from(user_repository);

    // `move` to capture variables from the surrounding environment
    let server = HttpServer::new(move || {
        info!("Starting actix-web worker");

        App::new()
            .wrap(TracingLogger::default())
            // Uploaded images are buffered in memory, raise the default 2MiB cap
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(10 * 1024 * 1024)
                    .memory_limit(10 * 1024 * 1024),
            )
            .route("/health_check", web::get().to(health_check))
            .route("/embedd", web::post().to(embed_image))
            .route("/create-pic", web::post().to(create_picture))
            // Route name kept as observed by existing consumers
            .route("/ceate-user", web::post().to(create_user))
            .route("/get-user", web::get().to(get_user))
            .route("/delete-user", web::delete().to(delete_user))
            .app_data(embedder_client.clone())
            .app_data(vector_repository.clone())
            .app_data(user_repository.clone())
    })
    .listen(listener)?;

    // If no workers were set, use the actix-web settings (number of workers = number of physical CPUs)
    if let Some(nb_workers) = nb_workers {
        return Ok(server.workers(nb_workers).run());
    }

    // No await
    Ok(server.run())
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(settings.with_db())
}

/// Set up a client to Qdrant
pub fn get_qdrant_client(config: &QdrantSettings) -> Result<QdrantClient, VectorRepositoryError> {
    let qdrant_config = QdrantClientConfig::from_url(&config.get_grpc_base_url());
    QdrantClient::new(Some(qdrant_config))
        .map_err(|e| VectorRepositoryError::Backend(e.to_string()))
}

/// Builds the lazy gRPC channel to the inference service.
/// The actual connection is established on the first call.
pub fn get_embedder_channel(
    settings: &EmbedderSettings,
) -> Result<Channel, tonic::transport::Error> {
    Ok(tonic::transport::Endpoint::from_shared(settings.get_grpc_uri())?.connect_lazy())
}
