//! crmsync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `SyncedItem`, `PersistedRecord`, `Lead`
//! - **Use cases** - `ReconcileFolderUseCase`, `HandleCallEventUseCase`
//! - **Port definitions** - Traits for adapters: `IRemoteTreeSource`, `IRecordStore`, `ILeadRepository`
//! - **Configuration** - YAML config with environment overrides
//!
//! # Architecture
//!
//! The domain module holds pure business logic. Ports define trait
//! interfaces that adapter crates implement. Use cases orchestrate domain
//! entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
