/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::require (route 単位の permission guard), cors, http (横断的関心事)
 */
pub mod auth;
pub mod cors;
pub mod http;
