//! C bindings for the mobile host
//!
//! Every call takes and returns null-terminated UTF-8 strings. Returned strings
//! are owned by the caller and released with `pulse_free_string`. Failures
//! return NULL (or -1 for status calls) and leave a message readable through
//! `pulse_last_error` on the calling thread.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{Local, NaiveDate};

use crate::pipeline::{series_from_json, tdee_from_json, PulseProcessor};
use crate::schema::LogAdapter;
use crate::types::{DailyLog, SeriesWindow, TdeeWindow, UserSettings};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Errors crossing the C boundary are plain messages
type FfiResult<T> = Result<T, String>;

fn record_error(msg: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = CString::new(msg).ok());
}

fn reset_error() {
    LAST_ERROR.with(|slot| slot.borrow_mut().take());
}

/// Borrow a required argument; NULL or invalid UTF-8 is an error naming `what`
unsafe fn arg_str(raw: *const c_char, what: &str) -> FfiResult<String> {
    optional_arg(raw).ok_or_else(|| format!("Invalid {} string pointer", what))
}

unsafe fn optional_arg(raw: *const c_char) -> Option<String> {
    if raw.is_null() {
        return None;
    }
    CStr::from_ptr(raw).to_str().ok().map(str::to_owned)
}

unsafe fn handle_ref<'a>(handle: *const PulseProcessorHandle) -> FfiResult<&'a PulseProcessor> {
    handle
        .as_ref()
        .map(|h| &h.processor)
        .ok_or_else(|| "Null processor pointer".to_string())
}

unsafe fn handle_mut<'a>(
    handle: *mut PulseProcessorHandle,
) -> FfiResult<&'a mut PulseProcessor> {
    handle
        .as_mut()
        .map(|h| &mut h.processor)
        .ok_or_else(|| "Null processor pointer".to_string())
}

/// A NULL `today` means the local current date
unsafe fn resolve_today(today: *const c_char) -> FfiResult<NaiveDate> {
    match optional_arg(today) {
        Some(s) => LogAdapter::parse_date(&s).map_err(|e| e.to_string()),
        None => Ok(Local::now().date_naive()),
    }
}

/// Negative lengths map to 0, which no window preset accepts
fn window_days(days: i32) -> u32 {
    u32::try_from(days).unwrap_or(0)
}

/// Hand a JSON document to the caller, or NULL with the error recorded
fn into_c_json(result: FfiResult<String>) -> *mut c_char {
    match result.and_then(|json| CString::new(json).map_err(|e| e.to_string())) {
        Ok(json) => json.into_raw(),
        Err(msg) => {
            record_error(msg);
            ptr::null_mut()
        }
    }
}

/// Map a result to a status code, recording the error on failure
fn into_status(result: FfiResult<i32>) -> i32 {
    result.unwrap_or_else(|msg| {
        record_error(msg);
        -1
    })
}

// ----------------------------------------------------------------------------
// One-shot calls
// ----------------------------------------------------------------------------

/// Build the analytics series from a JSON array of logs.
///
/// # Safety
/// - `logs_json` must be a valid null-terminated C string.
/// - `today` may be NULL for the local date, otherwise a `YYYY-MM-DD` C string.
/// - The result must be released with `pulse_free_string`. NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_series_from_json(
    logs_json: *const c_char,
    window: i32,
    today: *const c_char,
) -> *mut c_char {
    reset_error();
    into_c_json((|| -> FfiResult<String> {
        let logs = arg_str(logs_json, "logs JSON")?;
        let today = resolve_today(today)?;
        series_from_json(&logs, window_days(window), today).map_err(|e| e.to_string())
    })())
}

/// Estimate TDEE from a JSON array of logs.
///
/// # Safety
/// - `logs_json` and `weight_unit` must be valid null-terminated C strings.
/// - The result must be released with `pulse_free_string`. NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_tdee_from_json(
    logs_json: *const c_char,
    window: i32,
    weight_unit: *const c_char,
) -> *mut c_char {
    reset_error();
    into_c_json((|| -> FfiResult<String> {
        let logs = arg_str(logs_json, "logs JSON")?;
        let unit = arg_str(weight_unit, "weight unit")?;
        tdee_from_json(&logs, window_days(window), &unit).map_err(|e| e.to_string())
    })())
}

// ----------------------------------------------------------------------------
// Processor handle
// ----------------------------------------------------------------------------

/// Opaque owner of a [`PulseProcessor`] handed to the host
pub struct PulseProcessorHandle {
    processor: PulseProcessor,
}

/// Create a processor. `settings_json` may be NULL for default settings.
///
/// # Safety
/// - `settings_json` must be NULL or a valid null-terminated C string.
/// - The handle must be released with `pulse_processor_free`. NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_new(
    settings_json: *const c_char,
) -> *mut PulseProcessorHandle {
    reset_error();

    let settings = match optional_arg(settings_json) {
        None => Ok(UserSettings::default()),
        Some(json) => serde_json::from_str::<UserSettings>(&json)
            .map_err(|e| format!("Invalid settings JSON: {}", e)),
    };

    match settings {
        Ok(settings) => Box::into_raw(Box::new(PulseProcessorHandle {
            processor: PulseProcessor::with_settings(settings),
        })),
        Err(msg) => {
            record_error(msg);
            ptr::null_mut()
        }
    }
}

/// Release a processor handle. NULL is ignored.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new` and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_free(processor: *mut PulseProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Validate and store one log, replacing any log for the same date.
/// Returns 0 on success, -1 on error.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new`.
/// - `log_json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_upsert_log(
    processor: *mut PulseProcessorHandle,
    log_json: *const c_char,
) -> i32 {
    reset_error();
    into_status((|| -> FfiResult<i32> {
        let processor = handle_mut(processor)?;
        let log: DailyLog = serde_json::from_str(&arg_str(log_json, "log JSON")?)
            .map_err(|e| format!("Invalid log JSON: {}", e))?;
        processor.upsert_log(log).map_err(|e| e.to_string())?;
        Ok(0)
    })())
}

/// Delete the log for a date. Returns 1 if a log was removed, 0 if the date
/// had none, -1 on error.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new`.
/// - `date` must be a valid null-terminated `YYYY-MM-DD` C string.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_remove_log(
    processor: *mut PulseProcessorHandle,
    date: *const c_char,
) -> i32 {
    reset_error();
    into_status((|| -> FfiResult<i32> {
        let processor = handle_mut(processor)?;
        let date = LogAdapter::parse_date(&arg_str(date, "date")?).map_err(|e| e.to_string())?;
        Ok(i32::from(processor.remove_log(date).is_some()))
    })())
}

/// Replace every stored log with a freshly fetched JSON array.
/// Returns 0 on success, -1 on error.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new`.
/// - `logs_json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_hydrate(
    processor: *mut PulseProcessorHandle,
    logs_json: *const c_char,
) -> i32 {
    reset_error();
    into_status((|| -> FfiResult<i32> {
        let processor = handle_mut(processor)?;
        let logs = LogAdapter::parse_array(&arg_str(logs_json, "logs JSON")?)
            .map_err(|e| e.to_string())?;
        processor.hydrate(logs);
        Ok(0)
    })())
}

/// Series over the stored logs.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new`.
/// - `today` may be NULL for the local date, otherwise a `YYYY-MM-DD` C string.
/// - The result must be released with `pulse_free_string`. NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_series(
    processor: *mut PulseProcessorHandle,
    window: i32,
    today: *const c_char,
) -> *mut c_char {
    reset_error();
    into_c_json((|| -> FfiResult<String> {
        let processor = handle_ref(processor)?;
        let window = SeriesWindow::try_from(window_days(window)).map_err(|e| e.to_string())?;
        let today = resolve_today(today)?;
        serde_json::to_string(&processor.series(window, today)).map_err(|e| e.to_string())
    })())
}

/// TDEE over the stored logs, in the configured weight unit.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new`.
/// - The result must be released with `pulse_free_string`. NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_tdee(
    processor: *mut PulseProcessorHandle,
    window: i32,
) -> *mut c_char {
    reset_error();
    into_c_json((|| -> FfiResult<String> {
        let processor = handle_ref(processor)?;
        let window = TdeeWindow::try_from(window_days(window)).map_err(|e| e.to_string())?;
        serde_json::to_string(&processor.tdee(window)).map_err(|e| e.to_string())
    })())
}

/// Snapshot the stored logs and settings as JSON.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new`.
/// - The result must be released with `pulse_free_string`. NULL on error.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_save_state(
    processor: *mut PulseProcessorHandle,
) -> *mut c_char {
    reset_error();
    into_c_json(handle_ref(processor).and_then(|p| p.save_state().map_err(|e| e.to_string())))
}

/// Restore logs and settings from a `pulse_processor_save_state` snapshot.
/// Returns 0 on success, -1 on error.
///
/// # Safety
/// - `processor` must come from `pulse_processor_new`.
/// - `json` must be a valid null-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn pulse_processor_load_state(
    processor: *mut PulseProcessorHandle,
    json: *const c_char,
) -> i32 {
    reset_error();
    into_status((|| -> FfiResult<i32> {
        let processor = handle_mut(processor)?;
        processor
            .load_state(&arg_str(json, "state JSON")?)
            .map_err(|e| e.to_string())?;
        Ok(0)
    })())
}

// ----------------------------------------------------------------------------
// Strings, errors, version
// ----------------------------------------------------------------------------

/// Release a string returned by any `pulse_*` call. NULL is ignored.
///
/// # Safety
/// - `ptr` must come from a `pulse_*` call and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn pulse_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Message for the most recent failure on this thread, or NULL.
///
/// # Safety
/// - The pointer stays valid until the next `pulse_*` call on this thread.
/// - It is owned by the library and must not be freed.
#[no_mangle]
pub unsafe extern "C" fn pulse_last_error() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(ptr::null(), |msg| msg.as_ptr())
    })
}

/// Library version as a static C string.
///
/// # Safety
/// - The pointer is static and must not be freed.
#[no_mangle]
pub unsafe extern "C" fn pulse_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
