use crate::domain::model::{
    normalize_postal_code, Municipality, PopulationProfile, PostalLookupResponse, RawFacility,
};
use crate::domain::ports::{DirectoryService, PostalLookupService};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Appends path segments to a base endpoint, escaping each one.
fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| AppError::InvalidConfigValueError {
        field: "endpoint".to_string(),
        value: base.to_string(),
        reason: e.to_string(),
    })?;
    url.path_segments_mut()
        .map_err(|_| AppError::ConfigError {
            message: format!("{} cannot be used as a base URL", base),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ---- directory service wire format ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MunicipalityPayload {
    id: String,
    nome: String,
    uf_sigla: String,
    uf_nome: Option<String>,
}

impl From<MunicipalityPayload> for Municipality {
    fn from(payload: MunicipalityPayload) -> Self {
        Municipality {
            id: payload.id,
            name: payload.nome,
            uf: payload.uf_sigla,
            uf_name: payload.uf_nome,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterPayload {
    #[serde(default)]
    lista_ubs: Option<Vec<FacilityPayload>>,
}

#[derive(Debug, Deserialize)]
struct FacilityPayload {
    id: Option<String>,
    #[serde(default)]
    nome: String,
    #[serde(default)]
    cnes: String,
    #[serde(default)]
    endereco: Option<String>,
    #[serde(default)]
    cep: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    medicos: u32,
    #[serde(default)]
    enfermeiros: u32,
}

impl From<FacilityPayload> for RawFacility {
    fn from(payload: FacilityPayload) -> Self {
        RawFacility {
            id: payload.id.unwrap_or_else(|| payload.cnes.clone()),
            name: payload.nome,
            cnes: payload.cnes,
            address: payload.endereco.unwrap_or_default(),
            postal_code: payload.cep.unwrap_or_default(),
            latitude: payload.latitude.unwrap_or(0.0),
            longitude: payload.longitude.unwrap_or(0.0),
            doctors: payload.medicos,
            nurses: payload.enfermeiros,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PopulationPayload {
    municipio_id: String,
    municipio_nome: String,
    #[serde(default)]
    populacao_total: u64,
    #[serde(default)]
    populacao_homens: u64,
    #[serde(default)]
    populacao_mulheres: u64,
    #[serde(default, rename = "faixa0a10")]
    faixa_0_10: u64,
    #[serde(default, rename = "faixa11a20")]
    faixa_11_20: u64,
    #[serde(default, rename = "faixa21a30")]
    faixa_21_30: u64,
    #[serde(default, rename = "faixa40Mais")]
    faixa_40_mais: u64,
}

impl From<PopulationPayload> for PopulationProfile {
    fn from(payload: PopulationPayload) -> Self {
        PopulationProfile {
            municipality_id: payload.municipio_id,
            municipality_name: payload.municipio_nome,
            total: payload.populacao_total,
            men: payload.populacao_homens,
            women: payload.populacao_mulheres,
            age_0_10: payload.faixa_0_10,
            age_11_20: payload.faixa_11_20,
            age_21_30: payload.faixa_21_30,
            age_40_plus: payload.faixa_40_mais,
        }
    }
}

/// JSON client for the municipality/facility directory.
#[derive(Debug, Clone)]
pub struct HttpDirectoryService {
    endpoint: String,
    client: Client,
}

impl HttpDirectoryService {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl DirectoryService for HttpDirectoryService {
    async fn list_municipalities(&self, uf: &str) -> Result<Vec<Municipality>> {
        let url = endpoint_url(&self.endpoint, &["municipios"])?;
        tracing::debug!("Making directory request to: {}?uf={}", url, uf);

        let response = self
            .client
            .get(url)
            .query(&[("uf", uf)])
            .send()
            .await?
            .error_for_status()?;

        let payload: Option<Vec<MunicipalityPayload>> = response.json().await?;
        Ok(payload
            .unwrap_or_default()
            .into_iter()
            .map(Municipality::from)
            .collect())
    }

    async fn list_facilities(
        &self,
        municipality_id: &str,
        municipality_name: &str,
    ) -> Result<Option<Vec<RawFacility>>> {
        let url = endpoint_url(&self.endpoint, &["municipios", municipality_id, "estabelecimentos"])?;
        tracing::debug!("Making roster request to: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("nome", municipality_name)])
            .send()
            .await?;
        tracing::debug!("Roster response status: {}", response.status());

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let payload: Option<RosterPayload> = response.error_for_status()?.json().await?;
        Ok(payload
            .and_then(|roster| roster.lista_ubs)
            .map(|list| list.into_iter().map(RawFacility::from).collect()))
    }

    async fn population(
        &self,
        municipality_id: &str,
        municipality_name: &str,
    ) -> Result<Option<PopulationProfile>> {
        let url = endpoint_url(&self.endpoint, &["municipios", municipality_id, "populacao"])?;

        let response = self
            .client
            .get(url)
            .query(&[("nome", municipality_name)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let payload: Option<PopulationPayload> = response.error_for_status()?.json().await?;
        Ok(payload.map(PopulationProfile::from))
    }
}

// ---- postal lookup (ViaCEP style) ----

#[derive(Debug, Deserialize)]
struct ViaCepPayload {
    cep: Option<String>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
    /// `true` or `"true"` when the code is unknown
    erro: Option<serde_json::Value>,
}

impl ViaCepPayload {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpPostalLookup {
    endpoint: String,
    client: Client,
}

impl HttpPostalLookup {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl PostalLookupService for HttpPostalLookup {
    async fn lookup(&self, postal_code: &str) -> Result<PostalLookupResponse> {
        let digits = normalize_postal_code(postal_code).ok_or_else(|| AppError::InvalidPostalCode {
            value: postal_code.to_string(),
        })?;
        let url = endpoint_url(&self.endpoint, &[digits.as_str(), "json"])?;
        tracing::debug!("Making postal lookup request to: {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(PostalLookupResponse {
                not_found: true,
                ..Default::default()
            });
        }

        let payload: ViaCepPayload = response.error_for_status()?.json().await?;
        Ok(PostalLookupResponse {
            not_found: payload.is_not_found(),
            postal_code: payload.cep,
            street: payload.logradouro,
            neighborhood: payload.bairro,
            locality: payload.localidade,
            region: payload.uf,
        })
    }
}
