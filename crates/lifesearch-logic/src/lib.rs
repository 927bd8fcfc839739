//! Pure habitability logic for LifeSearch.
//!
//! This crate contains all scoring logic that is independent of any web
//! framework, network client, or rendering backend. Functions take plain
//! data (already-fetched API rows, catalog rows, override text, weights)
//! and return results, making them unit-testable and reusable from the web
//! layer, the headless harness, and batch tools alike.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`analysis`] | Per-planet pipeline and batch runs that survive individual failures |
//! | [`catalog`] | Source rows, API results, HWC / HZGallery column maps and lookup |
//! | [`classification`] | Mass and temperature classes |
//! | [`config`] | Batch request shape and validation |
//! | [`constants`] | Earth/Sun references, physical constants, index coefficients |
//! | [`derivation`] | Equilibrium temperature, mass estimate, habitable zone, travel times |
//! | [`error`] | Error and warning taxonomy |
//! | [`factors`] | Rule-table factor scores (size, density, star type, ...) |
//! | [`names`] | Planet name normalization |
//! | [`overrides`] | User override text parsing |
//! | [`params`] | Provenance-tagged parameter record |
//! | [`report`] | Report data assembly for presentation |
//! | [`resolver`] | Source merge in fixed priority order, then gap filling |
//! | [`scoring`] | ESI, PHI, SPH aggregation and weight seeding |
//! | [`sephi`] | SEPHI likelihoods L1–L4 |
//! | [`weights`] | Weight sets and the global / per-planet weight store |

pub mod analysis;
pub mod catalog;
pub mod classification;
pub mod config;
pub mod constants;
pub mod derivation;
pub mod error;
pub mod factors;
pub mod names;
pub mod overrides;
pub mod params;
pub mod report;
pub mod resolver;
pub mod scoring;
pub mod sephi;
pub mod weights;
