//! The pure validation layer for the transaction create and edit forms.
//!
//! Parsing is separated from rendering: [validate] turns raw form input into
//! either a [NewTransaction] or typed per-field errors, and the views decide
//! how to display them.

use serde::Deserialize;

use super::core::{NewTransaction, Transaction};

/// The raw data entered by the user in the transaction form.
///
/// Every field is kept as the string the user submitted so the form can be
/// redisplayed with the original input preserved when validation fails.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFormData {
    /// A short text describing the transaction.
    #[serde(default)]
    pub title: String,
    /// The amount of money, as entered.
    #[serde(default)]
    pub amount: String,
    /// The transaction type, "income" or "expense".
    #[serde(default, rename = "type")]
    pub kind: String,
    /// The category value, e.g. "rent".
    #[serde(default)]
    pub category: String,
}

impl TransactionFormData {
    /// The form data that would reproduce `transaction`, used to pre-fill the
    /// edit form.
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            title: transaction.title.clone(),
            amount: transaction.amount.to_string(),
            kind: transaction.kind.to_string(),
            category: transaction.category.to_string(),
        }
    }
}

/// Per-field error messages for the transaction form.
#[derive(Debug, Default, PartialEq)]
pub struct TransactionFormErrors {
    /// The error for the title field, if any.
    pub title: Option<&'static str>,
    /// The error for the amount field, if any.
    pub amount: Option<&'static str>,
    /// The error for the type field, if any.
    pub kind: Option<&'static str>,
    /// The error for the category field, if any.
    pub category: Option<&'static str>,
}

impl TransactionFormErrors {
    /// Whether no field has an error.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.category.is_none()
    }
}

/// Check `form` and either produce the validated fields for a transaction or
/// the errors to display, one per offending field.
pub fn validate(form: &TransactionFormData) -> Result<NewTransaction, TransactionFormErrors> {
    let mut errors = TransactionFormErrors::default();

    let title = form.title.trim();
    if title.is_empty() {
        errors.title = Some("A title is required.");
    }

    let amount = match form.amount.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Some(amount),
        _ => {
            errors.amount = Some("Enter a valid amount.");
            None
        }
    };

    let kind = match form.kind.parse() {
        Ok(kind) => Some(kind),
        Err(_) => {
            errors.kind = Some("Choose either income or expense.");
            None
        }
    };

    let category = match form.category.parse() {
        Ok(category) => Some(category),
        Err(_) => {
            errors.category = Some("Choose a category.");
            None
        }
    };

    match (amount, kind, category) {
        (Some(amount), Some(kind), Some(category)) if errors.is_empty() => Ok(NewTransaction {
            title: title.to_owned(),
            amount,
            kind,
            category,
        }),
        _ => Err(errors),
    }
}
