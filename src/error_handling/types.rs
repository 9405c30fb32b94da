//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout the application.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Types of errors that can occur while fetching pages or probing links.
///
/// This enum categorizes actual error conditions - failures that prevent a page
/// from contributing links or a link from being confirmed alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // HTTP/Network errors
    /// Request builder error
    HttpRequestBuilderError,
    /// Redirect loop or policy error
    HttpRequestRedirectError,
    /// Status error not covered by a specific code below
    HttpRequestStatusError,
    /// Request timed out
    HttpRequestTimeoutError,
    /// Request failed mid-flight
    HttpRequestRequestError,
    /// Connection could not be established
    HttpRequestConnectError,
    /// Response body error
    HttpRequestBodyError,
    /// Response decoding error
    HttpRequestDecodeError,
    /// Other reqwest error
    HttpRequestOtherError,
    /// 429 Too Many Requests
    HttpRequestTooManyRequests,
    /// 403 Forbidden - typically bot detection
    HttpRequestBotDetectionError,
    // Specific HTTP status code errors (common ones for better debugging)
    /// 400 Bad Request
    HttpRequestBadRequest,
    /// 401 Unauthorized
    HttpRequestUnauthorized,
    /// 404 Not Found
    HttpRequestNotFound,
    /// 500 Internal Server Error
    HttpRequestInternalServerError,
    /// 502 Bad Gateway
    HttpRequestBadGateway,
    /// 503 Service Unavailable
    HttpRequestServiceUnavailable,
    /// 504 Gateway Timeout
    HttpRequestGatewayTimeout,
    // Less common status codes (406, 521, etc.) fall into the buckets below
    /// Other 4xx
    HttpRequestOtherClientError,
    /// Other 5xx
    HttpRequestOtherServerError,
}

/// Types of warnings that can occur during crawling.
///
/// Warnings track pages that fetched and parsed fine but yielded nothing,
/// which is worth surfacing without being a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// Playlist page parsed but contained no movie links
    EmptyPlaylist,
    /// Movie page parsed but contained no file-host link
    MissingExternalLink,
}

/// Types of informational metrics that can occur during crawling and probing.
///
/// Info metrics track notable events that aren't errors or warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// Host rejected HEAD (405/501), probe fell back to GET
    HeadNotAllowed,
    /// A transient failure was retried (root fetch or probe)
    TransientRetry,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestBuilderError => "HTTP request builder error",
            ErrorType::HttpRequestRedirectError => "HTTP request redirect error",
            ErrorType::HttpRequestStatusError => "HTTP request status error",
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestRequestError => "HTTP request error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::HttpRequestDecodeError => "HTTP request decode error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
            ErrorType::HttpRequestTooManyRequests => "Too many requests",
            ErrorType::HttpRequestBotDetectionError => "Bot detection (403 Forbidden)",
            ErrorType::HttpRequestBadRequest => "Bad Request (400)",
            ErrorType::HttpRequestUnauthorized => "Unauthorized (401)",
            ErrorType::HttpRequestNotFound => "Not Found (404)",
            ErrorType::HttpRequestInternalServerError => "Internal Server Error (500)",
            ErrorType::HttpRequestBadGateway => "Bad Gateway (502)",
            ErrorType::HttpRequestServiceUnavailable => "Service Unavailable (503)",
            ErrorType::HttpRequestGatewayTimeout => "Gateway Timeout (504)",
            ErrorType::HttpRequestOtherClientError => "Other client error (4xx)",
            ErrorType::HttpRequestOtherServerError => "Other server error (5xx)",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::EmptyPlaylist => "Playlist with no movie links",
            WarningType::MissingExternalLink => "Movie page with no file-host link",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::HeadNotAllowed => "HEAD not allowed, fell back to GET",
            InfoType::TransientRetry => "Transient failure retried",
        }
    }
}
