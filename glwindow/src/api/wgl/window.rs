//! The Win32 window, its class and the message pump.

use std::ffi::c_void;
use std::{io, mem};

use windows_sys::Win32::Foundation::{
    GetLastError, SetLastError, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM,
};
use windows_sys::Win32::Graphics::Gdi::{GetDC, GetStockObject, ReleaseDC, BLACK_BRUSH, HDC};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    AdjustWindowRectEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetClassInfoExW, LoadCursorW, LoadIconW, PeekMessageW, RegisterClassExW, SetWindowTextW,
    ShowWindow, TranslateMessage, UnregisterClassW, CS_HREDRAW, CS_OWNDC, CS_VREDRAW,
    CW_USEDEFAULT, GWLP_USERDATA, IDC_ARROW, IDI_APPLICATION, MSG, PM_REMOVE, SW_SHOW, WM_CLOSE,
    WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
};
#[cfg(target_pointer_width = "64")]
use windows_sys::Win32::UI::WindowsAndMessaging::{GetWindowLongPtrW, SetWindowLongPtrW};
#[cfg(target_pointer_width = "32")]
use windows_sys::Win32::UI::WindowsAndMessaging::{
    GetWindowLongW as GetWindowLongPtrW, SetWindowLongW as SetWindowLongPtrW,
};

use crate::error::{Error, ErrorKind, Result};
use crate::event::{CloseLatch, HostEvent};
use crate::window::WindowAttributes;

use super::encode_wide;

const CLASS_NAME: &str = "glwindow_class";

unsafe fn register_class(instance: HINSTANCE) -> Result<()> {
    let class_name = encode_wide(CLASS_NAME);

    unsafe {
        let mut class: WNDCLASSEXW = mem::zeroed();
        if GetClassInfoExW(instance, class_name.as_ptr(), &mut class) != 0 {
            return Ok(());
        }

        let icon = LoadIconW(0, IDI_APPLICATION);
        let mut class: WNDCLASSEXW = mem::zeroed();
        class.cbSize = mem::size_of::<WNDCLASSEXW>() as u32;
        class.style = CS_VREDRAW | CS_HREDRAW | CS_OWNDC;
        class.lpfnWndProc = Some(window_procedure);
        class.hInstance = instance;
        class.hIcon = icon;
        class.hCursor = LoadCursorW(0, IDC_ARROW);
        class.hbrBackground = GetStockObject(BLACK_BRUSH) as _;
        class.lpszClassName = class_name.as_ptr();
        class.hIconSm = icon;

        if RegisterClassExW(&class) == 0 {
            return Err(io::Error::last_os_error().into());
        }
    }

    Ok(())
}

pub(super) unsafe fn create_window(
    instance: HINSTANCE,
    attributes: &WindowAttributes,
) -> Result<HWND> {
    unsafe {
        register_class(instance)?;
    }

    let (width, height) = attributes.inner_size();
    let mut rect = RECT { left: 0, top: 0, right: width as i32, bottom: height as i32 };
    let class_name = encode_wide(CLASS_NAME);
    let title = encode_wide("");

    let hwnd = unsafe {
        AdjustWindowRectEx(&mut rect, WS_OVERLAPPEDWINDOW, 0, 0);
        CreateWindowExW(
            0,
            class_name.as_ptr(),
            title.as_ptr(),
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            rect.right - rect.left,
            rect.bottom - rect.top,
            0,
            0,
            instance,
            std::ptr::null(),
        )
    };

    if hwnd == 0 {
        let err = io::Error::last_os_error();
        unsafe {
            UnregisterClassW(class_name.as_ptr(), instance);
        }
        return Err(err.into());
    }

    Ok(hwnd)
}

/// Destroy the window and unregister the class. The latter fails while other
/// windows of the class are alive, which is fine.
pub(super) unsafe fn destroy_window(instance: HINSTANCE, hwnd: HWND) {
    let class_name = encode_wide(CLASS_NAME);
    unsafe {
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
        DestroyWindow(hwnd);
        UnregisterClassW(class_name.as_ptr(), instance);
    }
}

pub(super) unsafe fn set_title(hwnd: HWND, title: &str) -> Result<()> {
    let title = encode_wide(title);
    if unsafe { SetWindowTextW(hwnd, title.as_ptr()) } == 0 {
        return Err(io::Error::last_os_error().into());
    }

    Ok(())
}

/// Point the window's user data at the latch for the window procedure.
pub(super) unsafe fn attach_latch(hwnd: HWND, latch: &CloseLatch) -> Result<()> {
    unsafe {
        SetLastError(0);
        let previous = SetWindowLongPtrW(hwnd, GWLP_USERDATA, latch.as_ptr() as _);
        if previous == 0 && GetLastError() != 0 {
            let err = Error::from(io::Error::last_os_error());
            return Err(err.with_kind(ErrorKind::ProtocolRegistrationFailed));
        }
    }

    Ok(())
}

pub(super) unsafe fn get_dc(hwnd: HWND) -> Result<HDC> {
    let hdc = unsafe { GetDC(hwnd) };
    if hdc == 0 {
        return Err(io::Error::last_os_error().into());
    }

    Ok(hdc)
}

pub(super) unsafe fn release_dc(hwnd: HWND, hdc: HDC) {
    unsafe {
        ReleaseDC(hwnd, hdc);
    }
}

pub(super) unsafe fn show_window(hwnd: HWND) -> Result<()> {
    // The return value is the previous visibility, not an error.
    unsafe {
        ShowWindow(hwnd, SW_SHOW);
    }

    Ok(())
}

/// Dispatch every queued message of the thread without blocking.
pub(super) unsafe fn pump_messages() {
    unsafe {
        let mut msg: MSG = mem::zeroed();
        while PeekMessageW(&mut msg, 0, 0, 0, PM_REMOVE) != 0 {
            TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

fn translate(message: u32) -> HostEvent {
    if message == WM_CLOSE {
        HostEvent::CloseRequested
    } else {
        HostEvent::Other
    }
}

unsafe extern "system" fn window_procedure(
    hwnd: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match translate(message) {
        HostEvent::CloseRequested => {
            // The window stays alive until it's destroyed explicitly.
            unsafe {
                let latch = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const c_void;
                CloseLatch::request_from_ptr(latch);
            }
            0
        },
        HostEvent::Other => unsafe { DefWindowProcW(hwnd, message, wparam, lparam) },
    }
}
