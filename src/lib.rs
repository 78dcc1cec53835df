//! Campus assistant chat: a relay to a Rasa webhook and the client-side conversation.

// Interdiction stricte de pratiques dangereuses ou non idiomatiques
#![deny(warnings)] // Tous les warnings sont traités comme des erreurs
#![deny(unsafe_code)] // Le code unsafe est interdit
#![deny(missing_docs)] // Toute API publique doit être documentée
#![deny(dead_code)] // Le code inutilisé est interdit
#![deny(non_camel_case_types)]
// Les types doivent suivre la convention CamelCase

// Options supplémentaires pour ne rien laisser passer
#![deny(unused_imports)] // Les imports inutilisés sont interdits
#![deny(unused_variables)] // Les variables inutilisées sont interdites
#![deny(unused_must_use)] // Les Result et Option doivent être traités
#![deny(non_snake_case)] // Variables et fonctions en snake_case
#![deny(non_upper_case_globals)] // Constantes en MAJUSCULE
#![deny(nonstandard_style)]
#![forbid(unsafe_op_in_unsafe_fn)]
// Pas d'opération unsafe implicite, même dans une fonction unsafe

// Clippy pour stricte discipline
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)] // Lints expérimentales
#![deny(clippy::unwrap_used)] // Interdit unwrap()
#![deny(clippy::expect_used)] // Interdit expect()
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)] // Le rendu terminal reste dans le binaire
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::missing_const_for_fn)] // Force const lorsque possible
#![deny(clippy::unwrap_in_result)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]
#![deny(clippy::shadow_unrelated)]
#![deny(clippy::too_many_arguments)]
#![deny(clippy::cognitive_complexity)]

// Lints pour sécurité et robustesse
#![deny(overflowing_literals)] // Interdit les littéraux qui débordent

/// Environment-driven configuration for both binaries.
#[allow(clippy::missing_const_for_fn)]
pub mod config;
/// Conversation state, sender identity and relay client.
#[allow(
    clippy::missing_const_for_fn,
    clippy::option_if_let_else,
    clippy::significant_drop_tightening
)]
pub mod conversation;
/// HTTP relay between the chat client and the Rasa webhook.
#[allow(
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::unused_async
)]
pub mod relay;
/// Entry helpers to start the relay.
pub mod start_relay;
