//! In-memory model of the ledger service: users, tokens, accounts and movements.

use std::collections::{BTreeMap, HashSet};

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value, json};

pub const MSG_DUPLICATE_ACCOUNT: &str = "Já existe uma conta com esse nome!";
pub const MSG_ACCOUNT_NAME_REQUIRED: &str = "Nome é um campo obrigatório";
pub const MSG_ACCOUNT_NOT_FOUND: &str = "Conta não encontrada";
pub const MSG_MOVEMENT_NOT_FOUND: &str = "Movimentação não encontrada";
pub const MSG_BAD_LOGIN: &str = "Problemas com o login do usuário";
pub const MSG_FUTURE_MOVEMENT: &str = "Data da Movimentação deve ser menor ou igual à data atual";

const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: i64,
    pub nome: String,
    pub visivel: bool,
    pub usuario_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredMovement {
    pub id: i64,
    pub conta_id: i64,
    pub descricao: String,
    pub envolvido: String,
    pub tipo: String,
    pub data_transacao: String,
    pub data_pagamento: String,
    pub valor: String,
    pub status: bool,
    pub usuario_id: i64,
}

/// Failure returned by a ledger operation, mapped to an HTTP status by the router.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    /// 400 with `{"error": ...}`.
    BadRequest(String),
    /// 400 with a list of `{msg, param, location}` entries.
    Validation(Vec<Value>),
    NotFound(String),
    /// The service surfaces foreign-key violations as an unhandled 500.
    Constraint(Value),
}

#[derive(Debug)]
pub struct Ledger {
    user_id: i64,
    email: String,
    password: String,
    tokens: HashSet<String>,
    next_token: u64,
    accounts: BTreeMap<i64, Account>,
    movements: BTreeMap<i64, StoredMovement>,
    next_account_id: i64,
    next_movement_id: i64,
    unique_names: bool,
}

impl Ledger {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            user_id: 1,
            email: email.to_string(),
            password: password.to_string(),
            tokens: HashSet::new(),
            next_token: 0,
            accounts: BTreeMap::new(),
            movements: BTreeMap::new(),
            next_account_id: 1,
            next_movement_id: 1,
            unique_names: true,
        }
    }

    /// When off, account names may repeat and the duplicate-name rule never fires.
    pub fn set_unique_names(&mut self, on: bool) {
        self.unique_names = on;
    }

    /// Returns a fresh token for matching credentials.
    pub fn sign_in(&mut self, email: Option<&str>, password: Option<&str>) -> Option<String> {
        if email != Some(self.email.as_str()) || password != Some(self.password.as_str()) {
            return None;
        }
        self.next_token += 1;
        let token = format!("tok-{}-{}", self.user_id, self.next_token);
        self.tokens.insert(token.clone());
        Some(token)
    }

    /// Accepts `JWT <token>` for any token issued by [`Ledger::sign_in`].
    pub fn is_authorized(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(|v| v.strip_prefix("JWT "))
            .is_some_and(|t| self.tokens.contains(t.trim()))
    }

    /// Drops every account and movement; issued tokens stay valid.
    pub fn reset(&mut self) {
        self.accounts.clear();
        self.movements.clear();
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.values().cloned().collect()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn movement_count(&self) -> usize {
        self.movements.len()
    }

    pub fn create_account(&mut self, name: Option<&str>) -> Result<Account, LedgerError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| LedgerError::BadRequest(MSG_ACCOUNT_NAME_REQUIRED.to_string()))?;
        self.ensure_name_free(name, None)?;

        let account = Account {
            id: self.next_account_id,
            nome: name.to_string(),
            visivel: true,
            usuario_id: self.user_id,
        };
        self.next_account_id += 1;
        self.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    pub fn rename_account(&mut self, id: i64, name: Option<&str>) -> Result<Account, LedgerError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| LedgerError::BadRequest(MSG_ACCOUNT_NAME_REQUIRED.to_string()))?;
        self.ensure_name_free(name, Some(id))?;

        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| LedgerError::NotFound(MSG_ACCOUNT_NOT_FOUND.to_string()))?;
        account.nome = name.to_string();
        Ok(account.clone())
    }

    pub fn delete_account(&mut self, id: i64) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(&id) {
            return Err(LedgerError::NotFound(MSG_ACCOUNT_NOT_FOUND.to_string()));
        }
        if self.movements.values().any(|m| m.conta_id == id) {
            return Err(LedgerError::Constraint(json!({
                "name": "error",
                "table": "transacoes",
                "constraint": "transacoes_conta_id_foreign",
                "detail": format!("Key (id)=({id}) is still referenced from table \"transacoes\"."),
            })));
        }
        self.accounts.remove(&id);
        Ok(())
    }

    pub fn create_movement(&mut self, body: &Value) -> Result<StoredMovement, LedgerError> {
        let empty = Map::new();
        let fields = body.as_object().unwrap_or(&empty);
        let mut errors = Vec::new();

        let text = move |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let transaction_date = text("data_transacao");
        let payment_date = text("data_pagamento");
        let description = text("descricao");
        let involved = text("envolvido");
        let kind = text("tipo");

        match transaction_date {
            None => errors.push(validation("Data da Movimentação é obrigatório", "data_transacao")),
            Some(d) => match parse_date(d) {
                None => errors.push(validation(
                    "Data da Movimentação deve ser uma data válida",
                    "data_transacao",
                )),
                Some(date) if date > Local::now().date_naive() => {
                    errors.push(validation(MSG_FUTURE_MOVEMENT, "data_transacao"));
                }
                Some(_) => {}
            },
        }
        match payment_date {
            None => errors.push(validation("Data do pagamento é obrigatório", "data_pagamento")),
            Some(d) if parse_date(d).is_none() => errors.push(validation(
                "Data do pagamento deve ser uma data válida",
                "data_pagamento",
            )),
            Some(_) => {}
        }
        if description.is_none() {
            errors.push(validation("Descrição é obrigatório", "descricao"));
        }
        if involved.is_none() {
            errors.push(validation("Interessado é obrigatório", "envolvido"));
        }
        if !matches!(kind, Some("REC" | "DESP")) {
            errors.push(validation("Tipo é obrigatório", "tipo"));
        }

        let amount = match fields.get("valor") {
            None | Some(Value::Null) => {
                errors.push(validation("Valor é obrigatório", "valor"));
                None
            }
            Some(v) => {
                let parsed = v
                    .as_f64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok()));
                if parsed.is_none() {
                    errors.push(validation("Valor deve ser um número", "valor"));
                }
                parsed
            }
        };

        let account_id = fields.get("conta_id").and_then(Value::as_i64);
        match account_id {
            None => errors.push(validation("Conta é obrigatório", "conta_id")),
            Some(id) if !self.accounts.contains_key(&id) => {
                errors.push(validation("Conta inválida", "conta_id"));
            }
            Some(_) => {}
        }

        let settled = fields.get("status").and_then(Value::as_bool);
        if settled.is_none() {
            errors.push(validation("Situação é obrigatório", "status"));
        }

        if !errors.is_empty() {
            return Err(LedgerError::Validation(errors));
        }

        let movement = StoredMovement {
            id: self.next_movement_id,
            conta_id: account_id.unwrap_or_default(),
            descricao: description.unwrap_or_default().to_string(),
            envolvido: involved.unwrap_or_default().to_string(),
            tipo: kind.unwrap_or_default().to_string(),
            data_transacao: transaction_date.unwrap_or_default().to_string(),
            data_pagamento: payment_date.unwrap_or_default().to_string(),
            valor: format!("{:.2}", amount.unwrap_or_default()),
            status: settled.unwrap_or_default(),
            usuario_id: self.user_id,
        };
        self.next_movement_id += 1;
        self.movements.insert(movement.id, movement.clone());
        Ok(movement)
    }

    pub fn delete_movement(&mut self, id: i64) -> Result<(), LedgerError> {
        self.movements
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| LedgerError::NotFound(MSG_MOVEMENT_NOT_FOUND.to_string()))
    }

    /// Settled balance per account: income adds, expense subtracts.
    pub fn balance(&self) -> Vec<Value> {
        self.accounts
            .values()
            .map(|account| {
                let total: f64 = self
                    .movements
                    .values()
                    .filter(|m| m.conta_id == account.id && m.status)
                    .map(|m| {
                        let v = m.valor.parse::<f64>().unwrap_or_default();
                        if m.tipo == "DESP" { -v } else { v }
                    })
                    .sum();
                json!({
                    "conta_id": account.id,
                    "conta": account.nome,
                    "saldo": format!("{total:.2}"),
                })
            })
            .collect()
    }

    fn ensure_name_free(&self, name: &str, except: Option<i64>) -> Result<(), LedgerError> {
        let taken = self.unique_names
            && self
                .accounts
                .values()
                .any(|a| a.nome == name && Some(a.id) != except);
        if taken {
            return Err(LedgerError::BadRequest(MSG_DUPLICATE_ACCOUNT.to_string()));
        }
        Ok(())
    }
}

fn validation(msg: &str, param: &str) -> Value {
    json!({ "msg": msg, "param": param, "location": "body" })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
