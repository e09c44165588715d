use crate::domain::models::geo::Coordinates;
use crate::domain::models::route::TravelTimeMatrix;
use crate::domain::ports::TravelTimeProvider;
use crate::error::EngineError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, warn};

/// Travel time provider backed by an OSRM-compatible `/table` endpoint.
pub struct HttpTravelMatrix {
    client: Client,
    base_url: String,
}

impl HttpTravelMatrix {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }
}

#[derive(Deserialize)]
struct TableResponse {
    code: String,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

#[async_trait]
impl TravelTimeProvider for HttpTravelMatrix {
    async fn travel_matrix(
        &self,
        points: &[Coordinates],
    ) -> Result<Option<TravelTimeMatrix>, EngineError> {
        if points.is_empty() {
            return Ok(None);
        }

        // OSRM takes lng,lat pairs separated by semicolons.
        let coords = points
            .iter()
            .map(|p| format!("{},{}", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!(
            "{}/table/v1/driving/{}?annotations=duration",
            self.base_url, coords
        );

        let res = self.client.get(&url).send().await.map_err(|e| {
            let msg = format!("Travel matrix connection error: {}", e);
            error!("{}", msg);
            EngineError::Provider(msg)
        })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Travel matrix failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(EngineError::Provider(msg));
        }

        let body: TableResponse = res.json().await.map_err(|e| {
            let msg = format!("Travel matrix returned malformed body: {}", e);
            error!("{}", msg);
            EngineError::Provider(msg)
        })?;

        if body.code != "Ok" {
            warn!("Travel matrix declined the request: {}", body.code);
            return Ok(None);
        }
        let Some(raw) = body.durations else {
            return Ok(None);
        };

        let mut durations = Vec::with_capacity(raw.len());
        for row in raw {
            let mut out = Vec::with_capacity(row.len());
            for cell in row {
                let Some(seconds) = cell else {
                    // Unroutable pair: callers fall back to the given stop order.
                    return Ok(None);
                };
                out.push(seconds.round().clamp(0.0, u32::MAX as f64) as u32);
            }
            durations.push(out);
        }

        match TravelTimeMatrix::new(durations) {
            Ok(matrix) => Ok(Some(matrix)),
            Err(err) => {
                warn!("Travel matrix shape rejected: {}", err);
                Ok(None)
            }
        }
    }
}
