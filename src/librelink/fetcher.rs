use std::sync::Arc;

use chrono::Utc;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::cache::{CachedSession, GlucoseReading, GlucoseStore};
use crate::error::FetchError;
use crate::nightscout::NightscoutUploader;

use super::auth::Authenticator;
use super::client::{LibreLinkClient, VendorResponse};
use super::models::{Connection, Envelope, GraphData};

pub const CONNECTIONS_PATH: &str = "/llu/connections";

/// 拉取最新血糖读数并写入缓存
#[derive(Debug, Clone)]
pub struct GlucoseFetcher {
    client: LibreLinkClient,
    authenticator: Authenticator,
    store: Arc<GlucoseStore>,
    uploader: Option<NightscoutUploader>,
}

impl GlucoseFetcher {
    pub fn new(client: LibreLinkClient, store: Arc<GlucoseStore>) -> Self {
        Self {
            authenticator: Authenticator::new(client.clone()),
            client,
            store,
            uploader: None,
        }
    }

    /// 成功写入缓存后再推送到 Nightscout
    pub fn with_uploader(mut self, uploader: NightscoutUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn store(&self) -> &Arc<GlucoseStore> {
        &self.store
    }

    pub fn uploader(&self) -> Option<&NightscoutUploader> {
        self.uploader.as_ref()
    }

    /// 完整的一轮：必要时登录，拉取读数，成功后才写缓存
    pub async fn refresh(&self) -> Result<Arc<GlucoseReading>, FetchError> {
        let (session, fresh) = match self.store.session().await {
            Some(session) => (session, false),
            None => (self.authenticate().await?, true),
        };

        let reading = match self.fetch_latest(&session).await {
            Err(FetchError::Unauthorized) if !fresh => {
                warn!("Session token rejected, re-authenticating");
                self.store.clear_session().await;
                let session = self.authenticate().await?;
                self.fetch_latest(&session).await
            }
            other => other,
        };

        let reading = match reading {
            Ok(reading) => reading,
            Err(e) => {
                if matches!(e, FetchError::Unauthorized) {
                    self.store.clear_session().await;
                }
                return Err(e);
            }
        };

        info!(
            "Fetched glucose reading {} at {} for patient {}",
            reading.value, reading.timestamp, reading.patient_id
        );
        Ok(self.store.publish(reading).await)
    }

    async fn authenticate(&self) -> Result<CachedSession, FetchError> {
        let session = self.authenticator.login().await?;
        self.store.set_session(session.clone()).await;
        Ok(session)
    }

    async fn fetch_latest(&self, session: &CachedSession) -> Result<GlucoseReading, FetchError> {
        let connections: Vec<Connection> = self.get_data(session, CONNECTIONS_PATH).await?;
        let connection = self.select_connection(connections)?;
        debug!(
            "Selected connection {} ({})",
            connection.patient_id,
            connection.first_name.as_deref().unwrap_or("unnamed")
        );

        let graph_path = format!("{}/{}/graph", CONNECTIONS_PATH, connection.patient_id);
        let graph: GraphData = self.get_data(session, &graph_path).await?;

        // 图表接口没有带测量值时退回到连接列表里的值
        let measurement = graph
            .connection
            .and_then(|c| c.glucose_measurement)
            .or(connection.glucose_measurement)
            .ok_or(FetchError::MissingField("glucoseMeasurement"))?;

        measurement.into_reading(&connection.patient_id, Utc::now())
    }

    fn select_connection(&self, connections: Vec<Connection>) -> Result<Connection, FetchError> {
        match &self.client.config().patient_id {
            Some(patient_id) => connections
                .into_iter()
                .find(|c| &c.patient_id == patient_id)
                .ok_or_else(|| FetchError::PatientNotFound(patient_id.clone())),
            None => connections.into_iter().next().ok_or(FetchError::NoConnections),
        }
    }

    async fn get_data<T>(&self, session: &CachedSession, path: &str) -> Result<T, FetchError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self.client.get_authorized(session, path).await?;
        let envelope: Envelope<T> = check_status(&response)?.json()?;
        match envelope.status {
            0 => envelope.data.ok_or(FetchError::MissingField("data")),
            401 => Err(FetchError::Unauthorized),
            status => Err(FetchError::VendorStatus(status)),
        }
    }
}

fn check_status(response: &VendorResponse) -> Result<&VendorResponse, FetchError> {
    match response.status {
        StatusCode::UNAUTHORIZED => Err(FetchError::Unauthorized),
        status if status.is_success() => Ok(response),
        status => Err(FetchError::HttpStatus(status)),
    }
}
