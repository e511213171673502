//! Lead entity and call-status state machine
//!
//! ## State Machine
//!
//! ```text
//!            ringing             answered             hangup
//!   None ──────────► Ringing ──────────► InCall ──────────► CallDone
//!                       ▲                                      │
//!                       └──────────────── ringing ─────────────┘
//! ```
//!
//! The PBX is authoritative: every event is applied regardless of the
//! current status, so a missed `answered` still ends in `CallDone` (just
//! without a duration).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{errors::DomainError, newtypes::LeadId};

/// Number of trailing digits used for the suffix phone match
pub const PHONE_SUFFIX_DIGITS: usize = 9;

// ============================================================================
// CallStatus / CallEvent
// ============================================================================

/// Call status of a lead
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    None,
    Ringing,
    InCall,
    CallDone,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::None => "none",
            CallStatus::Ringing => "ringing",
            CallStatus::InCall => "in_call",
            CallStatus::CallDone => "call_done",
        }
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(CallStatus::None),
            "ringing" => Ok(CallStatus::Ringing),
            "in_call" => Ok(CallStatus::InCall),
            "call_done" => Ok(CallStatus::CallDone),
            other => Err(DomainError::InvalidCallState(format!(
                "unknown call status '{other}'"
            ))),
        }
    }
}

/// Inbound PBX event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallEvent {
    Ringing,
    Answered,
    Hangup,
}

impl CallEvent {
    /// Every accepted event name, in lifecycle order
    pub const NAMES: [&'static str; 3] = ["ringing", "answered", "hangup"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CallEvent::Ringing => "ringing",
            CallEvent::Answered => "answered",
            CallEvent::Hangup => "hangup",
        }
    }
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallEvent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ringing" => Ok(CallEvent::Ringing),
            "answered" => Ok(CallEvent::Answered),
            "hangup" => Ok(CallEvent::Hangup),
            other => Err(DomainError::InvalidCallState(format!(
                "unknown event '{other}'; valid events: {}",
                CallEvent::NAMES.join(", ")
            ))),
        }
    }
}

// ============================================================================
// CallStateUpdate
// ============================================================================

/// Fields written to a lead by one call event
///
/// `None` on an `Option<Option<_>>` field means "leave unchanged";
/// `Some(None)` means "clear".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallStateUpdate {
    pub call_status: CallStatus,
    pub call_started_at: Option<Option<DateTime<Utc>>>,
    pub last_call_duration: Option<i64>,
    pub last_call_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Lead
// ============================================================================

/// A contact that can receive PBX calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    id: LeadId,
    name: String,
    /// Phone number as entered (not normalized)
    phone: String,
    call_status: CallStatus,
    call_started_at: Option<DateTime<Utc>>,
    /// Duration of the last completed call in whole seconds
    last_call_duration: Option<i64>,
    last_call_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl Lead {
    /// Creates a new lead with no call history
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: LeadId::new(),
            name: name.into(),
            phone: phone.into(),
            call_status: CallStatus::None,
            call_started_at: None,
            last_call_duration: None,
            last_call_at: None,
            created_at: Utc::now(),
        }
    }

    /// Reconstitutes a lead from storage
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: LeadId,
        name: String,
        phone: String,
        call_status: CallStatus,
        call_started_at: Option<DateTime<Utc>>,
        last_call_duration: Option<i64>,
        last_call_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            phone,
            call_status,
            call_started_at,
            last_call_duration,
            last_call_at,
            created_at,
        }
    }

    pub fn id(&self) -> &LeadId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn call_status(&self) -> CallStatus {
        self.call_status
    }

    pub fn call_started_at(&self) -> Option<DateTime<Utc>> {
        self.call_started_at
    }

    pub fn last_call_duration(&self) -> Option<i64> {
        self.last_call_duration
    }

    pub fn last_call_at(&self) -> Option<DateTime<Utc>> {
        self.last_call_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Computes the update `event` produces at time `now`
    ///
    /// Pure: the lead itself is not modified. Use [`Lead::apply`] to fold
    /// the update back in.
    ///
    /// `ringing` always clears `call_started_at`. `hangup` clears it too when
    /// a call was in progress, turning it into `last_call_duration`; with no
    /// recorded start the field is left alone and no duration is reported.
    pub fn transition(&self, event: CallEvent, now: DateTime<Utc>) -> CallStateUpdate {
        match event {
            CallEvent::Ringing => CallStateUpdate {
                call_status: CallStatus::Ringing,
                call_started_at: Some(None),
                last_call_duration: None,
                last_call_at: None,
            },
            CallEvent::Answered => CallStateUpdate {
                call_status: CallStatus::InCall,
                call_started_at: Some(Some(now)),
                last_call_duration: None,
                last_call_at: None,
            },
            CallEvent::Hangup => {
                let duration = self
                    .call_started_at
                    .map(|start| (now - start).num_seconds().max(0));
                CallStateUpdate {
                    call_status: CallStatus::CallDone,
                    call_started_at: duration.map(|_| None),
                    last_call_duration: duration,
                    last_call_at: Some(now),
                }
            }
        }
    }

    /// Folds an update into this lead
    pub fn apply(&mut self, update: &CallStateUpdate) {
        self.call_status = update.call_status;
        if let Some(started) = update.call_started_at {
            self.call_started_at = started;
        }
        if let Some(duration) = update.last_call_duration {
            self.last_call_duration = Some(duration);
        }
        if let Some(at) = update.last_call_at {
            self.last_call_at = Some(at);
        }
    }
}

// ============================================================================
// PhoneLookup
// ============================================================================

/// The three match keys tried for an inbound phone number
///
/// A lead matches if its stored phone equals `exact`, equals `normalized`,
/// or ends with `suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneLookup {
    /// The number exactly as received
    pub exact: String,
    /// Whitespace and punctuation removed; a leading `+` is kept
    pub normalized: String,
    /// Last [`PHONE_SUFFIX_DIGITS`] digits of the normalized number
    pub suffix: String,
}

impl PhoneLookup {
    /// Builds the match keys for `raw`
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPhone` if `raw` contains no digits
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let exact = raw.trim().to_string();
        let normalized = normalize_phone(&exact);
        let digits: Vec<char> = normalized.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(DomainError::InvalidPhone(raw.to_string()));
        }
        let start = digits.len().saturating_sub(PHONE_SUFFIX_DIGITS);
        let suffix = digits[start..].iter().collect();
        Ok(Self {
            exact,
            normalized,
            suffix,
        })
    }

    /// Returns true if a stored phone number satisfies any of the keys
    pub fn matches(&self, stored: &str) -> bool {
        stored == self.exact || stored == self.normalized || stored.ends_with(&self.suffix)
    }
}

/// Strips whitespace and punctuation, keeping digits and a leading `+`
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    if trimmed.starts_with('+') {
        out.push('+');
    }
    out.extend(trimmed.chars().filter(char::is_ascii_digit));
    out
}
