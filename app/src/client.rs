//! HTTP client for the spreadsheet-backed booking endpoint.
//!
//! The endpoint exposes two verbs: a filtered search (`GET {endpoint}/search`)
//! and a row append (`POST {endpoint}`). Both select the target sheet with a
//! `sheet` query parameter.

use crate::codec::{self, BookingRow, BOOKING_DATE};
use crate::config::SheetsConfig;
use crate::error::{BookingServiceError, ServiceResult};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, Url};
use std::sync::Arc;

/// Booking sheet client
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone, Debug)]
pub struct SheetsClient {
    client: Client,
    config: Arc<SheetsConfig>,
}

impl SheetsClient {
    /// Create a client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns [`BookingServiceError::Transport`] if the underlying HTTP
    /// client cannot be built (for example, no TLS backend).
    pub fn new(config: SheetsConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BookingServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Settings this client was built with
    #[must_use]
    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    /// `{endpoint}/search`, keeping any query the endpoint already carries
    fn search_url(&self) -> ServiceResult<Url> {
        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| BookingServiceError::Transport(format!("{} cannot be a base URL", self.config.endpoint)))?
            .pop_if_empty()
            .push("search");
        Ok(url)
    }

    /// Fetch the raw rows whose booking date equals `date`
    ///
    /// Any 2xx status is success. An empty array is an empty result, not an
    /// error.
    ///
    /// # Errors
    ///
    /// - [`BookingServiceError::Timeout`] or [`BookingServiceError::Transport`]
    ///   if the round trip fails
    /// - [`BookingServiceError::BadServerResponse`] for any non-2xx status
    /// - [`BookingServiceError::Decode`] if the body is not an array of rows
    pub async fn fetch_rows(&self, date: NaiveDate) -> ServiceResult<Vec<BookingRow>> {
        let date = codec::format_date(date, &self.config.date_format);

        tracing::debug!(sheet = %self.config.sheet_name, date = %date, "Querying booking sheet");

        let response = self
            .client
            .get(self.search_url()?)
            .query(&[
                ("sheet", self.config.sheet_name.as_str()),
                (BOOKING_DATE, date.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), date = %date, "Booking sheet query rejected");
            return Err(BookingServiceError::BadServerResponse);
        }

        let body = response.bytes().await?;
        let rows = codec::parse_rows(&body)?;

        tracing::info!(date = %date, rows = rows.len(), "Fetched booking rows");
        Ok(rows)
    }

    /// Append one row to the sheet
    ///
    /// Only `201 Created` counts as success.
    ///
    /// # Errors
    ///
    /// - [`BookingServiceError::Timeout`] or [`BookingServiceError::Transport`]
    ///   if the round trip fails
    /// - [`BookingServiceError::BadServerResponse`] for any status other than 201
    pub async fn append_row(&self, row: &BookingRow) -> ServiceResult<()> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .query(&[("sheet", self.config.sheet_name.as_str())])
            .json(row)
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                tracing::info!(movie = %row.movie_name, date = %row.booking_date, "Appended booking row");
                Ok(())
            },
            status => {
                tracing::warn!(
                    status = status.as_u16(),
                    movie = %row.movie_name,
                    "Booking sheet append rejected"
                );
                Err(BookingServiceError::BadServerResponse)
            },
        }
    }
}
