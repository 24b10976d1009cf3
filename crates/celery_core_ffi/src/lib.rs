use std::{
    ffi::{c_char, c_void, CStr, CString},
    ptr,
    sync::{Arc, Mutex},
};

use celery_core::Runtime;
use serde_json::json;

type CeleryEventCallback = unsafe extern "C" fn(event_json: *const c_char, user_data: *mut c_void);

#[derive(Clone, Copy)]
struct CallbackRegistration {
    callback: CeleryEventCallback,
    user_data: usize,
}

#[repr(C)]
pub struct CeleryRuntimeHandle {
    runtime: Runtime,
    callback: Arc<Mutex<Option<CallbackRegistration>>>,
}

#[no_mangle]
pub unsafe extern "C" fn celery_runtime_new(config_json: *const c_char) -> *mut CeleryRuntimeHandle {
    let config = if config_json.is_null() {
        String::new()
    } else {
        match CStr::from_ptr(config_json).to_str() {
            Ok(value) => value.to_string(),
            Err(error) => {
                eprintln!("celery_runtime_new: invalid UTF-8 config json: {error}");
                return ptr::null_mut();
            }
        }
    };

    let runtime = match Runtime::from_config_json(&config) {
        Ok(value) => value,
        Err(error) => {
            eprintln!("celery_runtime_new: failed to initialize runtime: {error}");
            return ptr::null_mut();
        }
    };

    let callback = Arc::new(Mutex::new(None::<CallbackRegistration>));
    let callback_ref = Arc::clone(&callback);
    runtime.set_event_callback(Arc::new(move |event, payload| {
        let registration = {
            let guard = callback_ref
                .lock()
                .expect("ffi callback registration mutex poisoned");
            *guard
        };
        if let Some(registration) = registration {
            let event_json = json!({ "event": event, "payload": payload }).to_string();
            if let Ok(c_event) = CString::new(event_json) {
                unsafe {
                    (registration.callback)(c_event.as_ptr(), registration.user_data as *mut c_void)
                };
            }
        }
    }));

    Box::into_raw(Box::new(CeleryRuntimeHandle { runtime, callback }))
}

#[no_mangle]
pub unsafe extern "C" fn celery_runtime_free(handle: *mut CeleryRuntimeHandle) {
    if handle.is_null() {
        return;
    }
    let boxed = Box::from_raw(handle);
    boxed.runtime.clear_event_callback();
    let mut guard = boxed
        .callback
        .lock()
        .expect("ffi callback registration mutex poisoned");
    *guard = None;
}

#[no_mangle]
pub unsafe extern "C" fn celery_set_event_callback(
    handle: *mut CeleryRuntimeHandle,
    callback: Option<CeleryEventCallback>,
    user_data: *mut c_void,
) {
    if handle.is_null() {
        return;
    }

    let runtime = &mut *handle;
    let mut guard = runtime
        .callback
        .lock()
        .expect("ffi callback registration mutex poisoned");
    *guard = callback.map(|value| CallbackRegistration {
        callback: value,
        user_data: user_data as usize,
    });
}

#[no_mangle]
pub unsafe extern "C" fn celery_dispatch_json(
    handle: *mut CeleryRuntimeHandle,
    action_json: *const c_char,
) -> *mut c_char {
    if handle.is_null() {
        return into_c_string(json_error("invalid_handle", "runtime handle is null").to_string());
    }
    if action_json.is_null() {
        return into_c_string(json_error("invalid_request", "action_json is null").to_string());
    }

    let action = match CStr::from_ptr(action_json).to_str() {
        Ok(value) => value,
        Err(error) => {
            return into_c_string(
                json_error("invalid_request", &format!("action_json must be UTF-8: {error}"))
                    .to_string(),
            );
        }
    };

    let runtime = &mut *handle;
    into_c_string(runtime.runtime.dispatch_json(action))
}

#[no_mangle]
pub unsafe extern "C" fn celery_state_json(handle: *mut CeleryRuntimeHandle) -> *mut c_char {
    if handle.is_null() {
        return into_c_string(json_error("invalid_handle", "runtime handle is null").to_string());
    }
    let runtime = &mut *handle;
    into_c_string(runtime.runtime.state_json())
}

#[no_mangle]
pub unsafe extern "C" fn celery_bootstrap_json(handle: *mut CeleryRuntimeHandle) -> *mut c_char {
    if handle.is_null() {
        return into_c_string(json_error("invalid_handle", "runtime handle is null").to_string());
    }
    let runtime = &mut *handle;
    into_c_string(runtime.runtime.bootstrap_json())
}

#[no_mangle]
pub unsafe extern "C" fn celery_summary_json(handle: *mut CeleryRuntimeHandle) -> *mut c_char {
    if handle.is_null() {
        return into_c_string(json_error("invalid_handle", "runtime handle is null").to_string());
    }
    let runtime = &mut *handle;
    into_c_string(runtime.runtime.summary_json())
}

#[no_mangle]
pub unsafe extern "C" fn celery_refresh_from_storage(
    handle: *mut CeleryRuntimeHandle,
) -> *mut c_char {
    if handle.is_null() {
        return into_c_string(json_error("invalid_handle", "runtime handle is null").to_string());
    }
    let runtime = &mut *handle;
    match runtime.runtime.refresh_from_storage() {
        Ok(restored) => {
            into_c_string(json!({ "ok": true, "data": { "restored": restored } }).to_string())
        }
        Err(error) => into_c_string(json_error("storage", &error.to_string()).to_string()),
    }
}

#[no_mangle]
pub unsafe extern "C" fn celery_free_string(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    let _ = CString::from_raw(ptr);
}

fn into_c_string(value: String) -> *mut c_char {
    match CString::new(value) {
        Ok(text) => text.into_raw(),
        Err(_) => CString::new(
            r#"{"ok":false,"error":{"code":"encoding_failure","message":"response contains invalid NUL"}}"#,
        )
        .expect("fallback c string literal is valid")
        .into_raw(),
    }
}

fn json_error(code: &str, message: &str) -> serde_json::Value {
    json!({
        "ok": false,
        "error": {
            "code": code,
            "message": message
        }
    })
}
