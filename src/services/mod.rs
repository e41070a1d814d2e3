/*
 * Responsibility
 * - handler から使う service 群 (トークン発行・検証, パスワードハッシュ)
 */
pub mod auth;
