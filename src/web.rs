use actix_web::{
    error::InternalError, http::header, middleware, web, App, HttpResponse, HttpServer,
};
use chrono::Local;
use serde::Deserialize;
use tracing::{info, warn};

use crate::allotment::{make_rng, AllotmentOptions, PriorityPass, RoomAllotter, RoomDistribution};
use crate::config::Config;
use crate::error::{AllotError, Envelope, Result};
use crate::export::{allotment_to_csv_bytes, export_filename};
use crate::roster::{read_roster, FieldMapping};

pub struct AppState {
    pub config: Config,
}

/// Query string of `POST /api/allot`; the body is the roster CSV.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllotQuery {
    pub distribution: String,
    pub mapping: String,
    pub gender: String,
    pub soe_priority: Option<String>,
    pub extra_fields: Option<String>,
    pub priority_pass: Option<String>,
    pub seed: Option<u64>,
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Csv,
    Json,
}

#[derive(Debug)]
pub struct AllotRequest {
    pub distribution: RoomDistribution,
    pub mapping: FieldMapping,
    pub options: AllotmentOptions,
    pub seed: Option<u64>,
    pub format: ResponseFormat,
}

/// Validates everything the allotment needs before the roster is read.
pub fn parse_request(query: &AllotQuery, config: &Config) -> Result<AllotRequest> {
    let distribution = RoomDistribution::from_json(&query.distribution)?;
    distribution.ensure_max_rooms(config.max_rooms)?;
    let mapping = FieldMapping::from_json(&query.mapping)?;

    let gender = query.gender.trim();
    if gender.is_empty() {
        return Err(AllotError::InvalidOption("gender is required".into()));
    }

    let soe_priority = query
        .soe_priority
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(config.soe_priority.as_str());

    let extra_fields = query
        .extra_fields
        .as_deref()
        .map(|fields| fields.split(',').map(str::trim).collect::<Vec<_>>())
        .unwrap_or_default();

    let priority_pass = match query.priority_pass.as_deref() {
        Some(pass) => pass.parse()?,
        None => PriorityPass::default(),
    };

    let format = match query.format.as_deref().map(str::trim) {
        None | Some("") | Some("csv") => ResponseFormat::Csv,
        Some("json") => ResponseFormat::Json,
        Some(other) => {
            return Err(AllotError::InvalidOption(format!(
                "unknown format {other:?} (expected csv or json)"
            )))
        }
    };

    Ok(AllotRequest {
        distribution,
        mapping,
        options: AllotmentOptions::new(gender)
            .with_soe_priority(soe_priority)
            .with_extra_fields(extra_fields)
            .with_priority_pass(priority_pass),
        seed: query.seed.or(config.seed),
        format,
    })
}

// Allotment upload endpoint
async fn allot(
    query: web::Query<AllotQuery>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let request = parse_request(&query, &state.config)?;

    if body.is_empty() {
        return Err(AllotError::EmptyUpload);
    }

    for role in request.mapping.missing_required() {
        warn!("Field mapping has no column for {role}");
    }

    let roster = read_roster(&body[..], &request.mapping)?;
    info!(
        "Received roster with {} row(s) for gender {:?}, {} room(s)",
        roster.students.len(),
        request.options.target_gender,
        request.distribution.total_rooms()
    );

    let mut rng = make_rng(request.seed);
    let allotment = RoomAllotter::new(&request.distribution, &request.mapping, &request.options)
        .allot_with_rng(&roster.students, &mut rng);

    match request.format {
        ResponseFormat::Json => Ok(HttpResponse::Ok().json(&allotment)),
        ResponseFormat::Csv => {
            let bytes = allotment_to_csv_bytes(&allotment, &request.mapping, &request.options)?;
            let filename = export_filename(&request.options.target_gender, Local::now());
            Ok(HttpResponse::Ok()
                .content_type("text/csv")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ))
                .body(bytes))
        }
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(Envelope::ok("ok"))
}

/// Registers routes and extractor limits. Shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<AppState>) {
    let limit = state.config.max_upload_bytes;
    cfg.app_data(state)
        .app_data(web::PayloadConfig::new(limit))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            let message = err.to_string();
            InternalError::from_response(err, HttpResponse::BadRequest().json(Envelope::failure(message)))
                .into()
        }))
        .route("/api/allot", web::post().to(allot))
        .route("/api/health", web::get().to(health));
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let bind = (config.host.clone(), config.port);
    info!("Starting allotment server on {}:{}", bind.0, bind.1);

    let state = web::Data::new(AppState { config });

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .configure(|cfg| configure(cfg, state))
    })
    .bind(bind)?
    .run()
    .await
}
