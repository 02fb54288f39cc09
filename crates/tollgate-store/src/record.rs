//! Stored representation of a ticket
//!
//! Field names follow the attribute names already present in deployed
//! tables (`ticketId`, `parkingLot`, ...). Status is kept as a plain string
//! so older records written with `in`/`out` still decode.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tollgate_core::{
    models::{Ticket, TicketStatus},
    AppError,
};
use uuid::Uuid;

/// Ticket as persisted by key-value backends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    pub ticket_id: String,
    pub plate: String,
    pub parking_lot: i32,
    pub entry_time: DateTime<Utc>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub charge: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    TicketStatus::Open.to_string()
}

impl TicketRecord {
    /// Encode to the JSON document stored in the backend
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored JSON document
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<&Ticket> for TicketRecord {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_id: ticket.id.to_string(),
            plate: ticket.plate.clone(),
            parking_lot: ticket.lot,
            entry_time: ticket.entry_time,
            status: ticket.status.to_string(),
            charge: ticket.charge,
            exit_time: ticket.exit_time,
        }
    }
}

impl TryFrom<TicketRecord> for Ticket {
    type Error = AppError;

    fn try_from(record: TicketRecord) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&record.ticket_id).map_err(|e| {
            AppError::Encoding(format!("bad ticketId {:?}: {}", record.ticket_id, e))
        })?;

        let status = TicketStatus::parse(&record.status).ok_or_else(|| {
            AppError::Encoding(format!("unknown status {:?}", record.status))
        })?;

        if record.charge < Decimal::ZERO {
            return Err(AppError::Encoding(format!(
                "negative charge {} on ticket {}",
                record.charge, id
            )));
        }

        Ok(Ticket {
            id,
            plate: record.plate,
            lot: record.parking_lot,
            entry_time: record.entry_time,
            status,
            charge: record.charge,
            exit_time: record.exit_time,
        })
    }
}
