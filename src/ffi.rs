//! FFI bindings for Brain Move Metrics
//!
//! This module provides C-compatible functions so a UI shell written in another
//! language can call the engine. All functions use C strings (null-terminated)
//! and return allocated memory that must be freed by the caller using
//! `bm_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use serde::Serialize;

use crate::error::ScoringError;
use crate::models::{AdaptiveDifficultyEngine, BrainMoveScoring};
use crate::pipeline::{score_dat_json, validate_words_json, CognitiveTracker};
use crate::storage::{FileStorage, MemoryStorage, SessionStorage};
use crate::types::SessionRecord;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Like `cstr_to_string`, recording an error naming the argument on failure
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {} string pointer", name));
    }
    value
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn json_to_cstr<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Validate a JSON array of words and return a `{valid, errors}` report.
///
/// # Safety
/// - `words_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `bm_free_string`.
/// - Returns NULL on error; call `bm_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bm_validate_words(words_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = required_arg(words_json, "words JSON") else {
        return ptr::null_mut();
    };

    match validate_words_json(&json) {
        Ok(report) => string_to_cstr(&report),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Score a JSON array of ten words and return the DAT result as JSON.
///
/// # Safety
/// - `words_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `bm_free_string`.
/// - Returns NULL on error (including failed validation); call `bm_last_error`.
#[no_mangle]
pub unsafe extern "C" fn bm_score_dat(words_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let Some(json) = required_arg(words_json, "words JSON") else {
        return ptr::null_mut();
    };

    match score_dat_json(&json) {
        Ok(result) => string_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Weighted Brain Move overall score from the five domain scores.
#[no_mangle]
pub extern "C" fn bm_overall_score(
    cmi: f64,
    leadership: f64,
    conflict: f64,
    sensory: f64,
    creativity: f64,
) -> f64 {
    BrainMoveScoring::calculate_overall_score(cmi, leadership, conflict, sensory, creativity)
}

/// Recommend the next difficulty level from a JSON array of recent scores.
///
/// # Safety
/// - `history_json` must be a valid null-terminated C string.
/// - Returns NaN on error; call `bm_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn bm_recommend_difficulty(
    current: f64,
    history_json: *const c_char,
) -> f64 {
    clear_last_error();

    let Some(json) = required_arg(history_json, "history JSON") else {
        return f64::NAN;
    };

    if !current.is_finite() {
        let err = ScoringError::InvalidParameter("current difficulty must be finite".to_string());
        set_last_error(&err.to_string());
        return f64::NAN;
    }

    match serde_json::from_str::<Vec<f64>>(&json) {
        Ok(history) => AdaptiveDifficultyEngine::recommend_difficulty(current, &history),
        Err(e) => {
            set_last_error(&e.to_string());
            f64::NAN
        }
    }
}

// ============================================================================
// Stateful Tracker API
// ============================================================================

/// Opaque handle to a CognitiveTracker
pub struct TrackerHandle {
    tracker: CognitiveTracker<Box<dyn SessionStorage>>,
}

/// Create a tracker persisting to `<data_dir>/brain_gym_metrics.json`.
///
/// Passing NULL keeps the history in memory only.
///
/// # Safety
/// - `data_dir` must be NULL or a valid null-terminated C string.
/// - Must be freed with `bm_tracker_free`.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_new(data_dir: *const c_char) -> *mut TrackerHandle {
    clear_last_error();

    let storage: Box<dyn SessionStorage> = match cstr_to_string(data_dir) {
        Some(dir) => Box::new(FileStorage::in_dir(dir)),
        None => Box::new(MemoryStorage::new()),
    };

    let handle = Box::new(TrackerHandle {
        tracker: CognitiveTracker::new(storage),
    });
    Box::into_raw(handle)
}

/// Free a tracker.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_free(tracker: *mut TrackerHandle) {
    if !tracker.is_null() {
        drop(Box::from_raw(tracker));
    }
}

/// Score a DAT attempt, record it as a creativity session, return the result.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - `words_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `bm_free_string`.
/// - Returns NULL on error, including a failed write; call `bm_last_error`.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_record_dat(
    tracker: *mut TrackerHandle,
    words_json: *const c_char,
    duration_ms: u64,
) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }
    let handle = &mut *tracker;

    let Some(json) = required_arg(words_json, "words JSON") else {
        return ptr::null_mut();
    };

    let words: Vec<String> = match serde_json::from_str(&json) {
        Ok(words) => words,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    match handle.tracker.record_dat(&words, duration_ms) {
        Ok(result) => json_to_cstr(&result),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Append a session record given as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - `record_json` must be a valid null-terminated C string.
/// - Returns 0 on success, -1 on error (including a failed write).
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_add_session(
    tracker: *mut TrackerHandle,
    record_json: *const c_char,
) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }
    let handle = &mut *tracker;

    let Some(json) = required_arg(record_json, "session JSON") else {
        return -1;
    };

    let record = match serde_json::from_str::<SessionRecord>(&json) {
        Ok(record) => record,
        Err(e) => {
            set_last_error(&e.to_string());
            return -1;
        }
    };

    match handle.tracker.try_record_session(record) {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Dashboard report as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - Returns a newly allocated string that must be freed with `bm_free_string`.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_report(tracker: *const TrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }
    json_to_cstr(&(*tracker).tracker.report())
}

/// Brain Move profile as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - Returns a newly allocated string that must be freed with `bm_free_string`.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_profile(tracker: *const TrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }
    json_to_cstr(&(*tracker).tracker.profile())
}

/// Full-state export document as JSON.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - Returns a newly allocated string that must be freed with `bm_free_string`.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_export(tracker: *const TrackerHandle) -> *mut c_char {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return ptr::null_mut();
    }

    match (*tracker).tracker.store().export_json() {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Replace the history with the sessions of an export document.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - `export_json` must be a valid null-terminated C string.
/// - Returns the number of restored sessions, or -1 on error.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_import(
    tracker: *mut TrackerHandle,
    export_json: *const c_char,
) -> i64 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }
    let handle = &mut *tracker;

    let Some(json) = required_arg(export_json, "export JSON") else {
        return -1;
    };

    match handle.tracker.store_mut().import_json(&json) {
        Ok(count) => count as i64,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Delete the whole session history.
///
/// # Safety
/// - `tracker` must be a valid pointer returned by `bm_tracker_new`.
/// - Returns 0 on success, -1 if the empty history could not be written.
#[no_mangle]
pub unsafe extern "C" fn bm_tracker_clear(tracker: *mut TrackerHandle) -> i32 {
    clear_last_error();

    if tracker.is_null() {
        set_last_error("Null tracker pointer");
        return -1;
    }
    let handle = &mut *tracker;

    match handle.tracker.store_mut().try_clear_data() {
        Ok(()) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by engine functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by an engine function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn bm_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next engine call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn bm_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn bm_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
