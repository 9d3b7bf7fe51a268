//! # Lanterne : coquille de navigateur de bureau sur Servo
//!
//! Une fenêtre, une barre d'outils minimale, et un client qui décide de ce
//! que le moteur ne tranche pas seul : popups, pages d'erreur, raccourcis,
//! menu contextuel, téléchargements, fermeture.
//!
//! ## Architecture des modules
//!
//! Logique de la coquille, indépendante du moteur :
//!
//! - [`engine`] : traits de capacité ([`engine::Browser`], handlers) et types
//!   partagés avec le moteur.
//! - [`client`] : [`client::BrowserClient`], registre des navigateurs et
//!   implémentation de toutes les capacités.
//! - [`shortcuts`], [`context_menu`], [`downloads`], [`error_page`] : les
//!   politiques du client, une par module.
//! - [`popups`] : popups en attente de leur première page.
//! - [`app`] : ligne de commande et script injecté dans les pages.
//! - [`config`], [`logging`], [`paths`], [`data_uri`], [`process`], [`error`].
//! - [`ui_thread`] : tâches postées au thread UI depuis un autre thread.
//! - [`chrome`], [`urlbar`], [`keyutils`] : barre d'outils et saisie.
//!
//! Adaptateur Servo + Winit (feature `servo`) :
//!
//! - [`browser`] : boucle d'événements Winit, pattern "Two-Phase App".
//! - [`servo_glue`] : `Waker`, fermetures inter-threads, `WebViewDelegate`.
//! - [`rendering`], [`resources`], [`preferences`] : mise en place du moteur.

pub mod app;
pub mod chrome;
pub mod client;
pub mod config;
pub mod context_menu;
pub mod data_uri;
pub mod downloads;
pub mod engine;
pub mod error;
pub mod error_page;
pub mod keyutils;
pub mod logging;
pub mod paths;
pub mod popups;
pub mod process;
pub mod shortcuts;
pub mod ui_thread;
pub mod urlbar;

#[cfg(feature = "servo")]
pub mod browser;
#[cfg(feature = "servo")]
pub mod preferences;
#[cfg(feature = "servo")]
pub mod rendering;
#[cfg(feature = "servo")]
pub mod resources;
#[cfg(feature = "servo")]
pub mod servo_glue;
