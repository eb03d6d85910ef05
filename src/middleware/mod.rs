/*
 * Responsibility
 * - auth: request authenticator + authorization gate
 * - cors / http: cross-cutting transport concerns
 */
pub mod auth;
pub mod cors;
pub mod http;
