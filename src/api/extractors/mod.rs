/*!
 * Request extractors
 *
 * - AuthClaims: guard 済みルートで検証済み claims を handler に渡す
 */
mod claims;

pub use claims::AuthClaims;
