use serde::Serialize;

use crate::dates::offset_date;

/// Direction of a movement: income (`REC`) or expense (`DESP`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MovementKind {
    #[serde(rename = "REC")]
    Income,
    #[serde(rename = "DESP")]
    Expense,
}

/// Transaction payload for `/transacoes`. Absent fields are omitted from the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Movement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "conta_id", skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(rename = "descricao", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "envolvido", skip_serializing_if = "Option::is_none")]
    pub involved_party: Option<String>,
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub kind: Option<MovementKind>,
    /// `dd/mm/yyyy`
    #[serde(rename = "data_transacao", skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
    /// `dd/mm/yyyy`
    #[serde(rename = "data_pagamento", skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(rename = "valor", skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "status", skip_serializing_if = "Option::is_none")]
    pub settled: Option<bool>,
}

impl Movement {
    /// A settled 1200.00 income dated in the past, accepted by the API as-is.
    pub fn valid(account_id: Option<i64>) -> Self {
        Self {
            id: None,
            account_id,
            description: Some("Segunda transação".to_string()),
            involved_party: Some("Joana".to_string()),
            kind: Some(MovementKind::Income),
            transaction_date: Some(offset_date(-2)),
            payment_date: Some(offset_date(-3)),
            amount: Some(1200.00),
            settled: Some(true),
        }
    }

    /// Every field absent: serializes to `{}`.
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transaction_date(mut self, date: impl Into<String>) -> Self {
        self.transaction_date = Some(date.into());
        self
    }
}
