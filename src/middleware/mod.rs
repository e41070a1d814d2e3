/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer 検証 / cors, http, security_headers: 横断的な transport 設定
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
