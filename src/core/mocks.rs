//! In-memory ports shared by the unit tests of the core pipeline.

use crate::domain::model::{Municipality, PopulationProfile, PostalLookupResponse, RawFacility};
use crate::domain::ports::{DirectoryService, PostalLookupService};
use crate::utils::error::{AppError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

fn connection_refused(what: &str) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        format!("{} unreachable", what),
    ))
}

#[derive(Debug, Clone)]
pub enum PostalReply {
    Found(PostalLookupResponse),
    Fail,
}

#[derive(Clone, Default)]
pub struct MockPostalLookup {
    replies: HashMap<String, PostalReply>,
    delays: HashMap<String, Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPostalLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, postal_code: &str, reply: PostalReply) -> Self {
        self.replies.insert(postal_code.to_string(), reply);
        self
    }

    pub fn with_delay(mut self, postal_code: &str, delay: Duration) -> Self {
        self.delays.insert(postal_code.to_string(), delay);
        self
    }

    pub fn street(street: &str) -> PostalReply {
        PostalReply::Found(PostalLookupResponse {
            postal_code: None,
            street: Some(street.to_string()),
            neighborhood: None,
            locality: Some("Manaus".to_string()),
            region: Some("AM".to_string()),
            not_found: false,
        })
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl PostalLookupService for MockPostalLookup {
    async fn lookup(&self, postal_code: &str) -> Result<PostalLookupResponse> {
        self.calls.lock().await.push(postal_code.to_string());

        if let Some(delay) = self.delays.get(postal_code) {
            tokio::time::sleep(*delay).await;
        }

        match self.replies.get(postal_code) {
            Some(PostalReply::Found(response)) => Ok(response.clone()),
            Some(PostalReply::Fail) | None => Err(connection_refused("postal lookup")),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RosterReply {
    List(Vec<RawFacility>),
    Missing,
    Fail,
}

#[derive(Clone)]
pub struct MockDirectory {
    municipalities: Option<Vec<Municipality>>,
    roster: RosterReply,
    population: Option<PopulationProfile>,
    roster_calls: Arc<Mutex<usize>>,
}

impl MockDirectory {
    pub fn new(roster: RosterReply) -> Self {
        Self {
            municipalities: Some(Vec::new()),
            roster,
            population: None,
            roster_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_municipalities(mut self, municipalities: Option<Vec<Municipality>>) -> Self {
        self.municipalities = municipalities;
        self
    }

    pub fn with_population(mut self, population: PopulationProfile) -> Self {
        self.population = Some(population);
        self
    }

    pub async fn roster_calls(&self) -> usize {
        *self.roster_calls.lock().await
    }
}

#[async_trait::async_trait]
impl DirectoryService for MockDirectory {
    async fn list_municipalities(&self, _uf: &str) -> Result<Vec<Municipality>> {
        self.municipalities
            .clone()
            .ok_or_else(|| connection_refused("directory"))
    }

    async fn list_facilities(
        &self,
        _municipality_id: &str,
        _municipality_name: &str,
    ) -> Result<Option<Vec<RawFacility>>> {
        *self.roster_calls.lock().await += 1;
        match &self.roster {
            RosterReply::List(facilities) => Ok(Some(facilities.clone())),
            RosterReply::Missing => Ok(None),
            RosterReply::Fail => Err(connection_refused("directory")),
        }
    }

    async fn population(
        &self,
        _municipality_id: &str,
        _municipality_name: &str,
    ) -> Result<Option<PopulationProfile>> {
        Ok(self.population.clone())
    }
}

pub fn manaus() -> Municipality {
    Municipality {
        id: "1302603".to_string(),
        name: "Manaus".to_string(),
        uf: "AM".to_string(),
        uf_name: Some("Amazonas".to_string()),
    }
}

pub fn raw_facility(id: &str, postal_code: &str, doctors: u32, nurses: u32) -> RawFacility {
    RawFacility {
        id: id.to_string(),
        name: format!("UBS {}", id),
        cnes: format!("20{}", id),
        address: format!("Stored street {}", id),
        postal_code: postal_code.to_string(),
        latitude: -3.1,
        longitude: -60.02,
        doctors,
        nurses,
    }
}
