//! Windows COM backend for browser root discovery.
//!
//! Two strategies are implemented here: shell-hosted enumeration through
//! `IShellWindows`, and native top-level window scanning that locates an
//! embedded `Internet Explorer_Server` control and requests its hosted
//! document with `WM_HTML_GETOBJECT` under a bounded wait. Both yield
//! `IHTMLDocument2`-backed handles; the core never sees the COM types.

use crate::discovery::{FrameNode, RootHandle};
use crate::types::AccessError;
use std::ffi::c_void;
use tracing::{debug, trace};
use windows::core::{w, Interface, PCSTR, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Globalization::{WideCharToMultiByte, CP_ACP};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, IDispatch, CLSCTX_ALL,
    COINIT_APARTMENTTHREADED,
};
use windows::Win32::System::Variant::{VARIANT, VT_DISPATCH, VT_I4};
use windows::Win32::UI::Accessibility::ObjectFromLresult;
use windows::Win32::UI::Shell::{IShellWindows, ShellWindows};
use windows::Win32::UI::WindowsAndMessaging::{
    FindWindowExW, GetClassNameW, RegisterWindowMessageW, SendMessageTimeoutW, SMTO_ABORTIFHUNG,
};
use windows::Win32::Web::InternetExplorer::{IHTMLDocument2, IHTMLWindow2, IWebBrowser2};

/// Window class of the embedded browser control hosting the document.
const EMBEDDED_BROWSER_CLASS: &str = "Internet Explorer_Server";

/// How deep to search a window's child hierarchy for the embedded control.
const CHILD_WINDOW_SEARCH_DEPTH: usize = 8;

/// Process-wide COM apartment guard.
///
/// Initialized once before the first discovery call and torn down on drop.
pub(crate) struct ComApartment {
    _private: (),
}

impl ComApartment {
    pub(crate) fn new() -> windows::core::Result<Self> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED).ok()? };
        Ok(Self { _private: () })
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// A top-level `IHTMLDocument2` obtained from either strategy.
struct DocumentRoot {
    doc: IHTMLDocument2,
}

impl RootHandle for DocumentRoot {
    fn url(&self) -> Result<String, AccessError> {
        let url = unsafe { self.doc.URL() }
            .map_err(|e| AccessError::UrlUnreadable(e.message()))?;
        Ok(url.to_string())
    }

    fn root_frame(&self) -> Box<dyn FrameNode> {
        Box::new(DocumentFrame {
            doc: self.doc.clone(),
        })
    }
}

/// One document in the frame hierarchy, root or descendant.
struct DocumentFrame {
    doc: IHTMLDocument2,
}

impl FrameNode for DocumentFrame {
    fn body(&self) -> Result<Vec<u8>, AccessError> {
        unsafe {
            let body = self
                .doc
                .body()
                .map_err(|e| AccessError::BodyUnreadable(e.message()))?;
            let html = body
                .outerHTML()
                .map_err(|e| AccessError::BodyUnreadable(e.message()))?;
            Ok(wide_to_acp(html.as_wide()))
        }
    }

    fn child_frames(&self) -> Result<Vec<Box<dyn FrameNode>>, AccessError> {
        unsafe {
            let frames = self
                .doc
                .frames()
                .map_err(|e| AccessError::ChildrenUnreadable(e.message()))?;
            let len = frames
                .length()
                .map_err(|e| AccessError::ChildrenUnreadable(e.message()))?;

            let mut children: Vec<Box<dyn FrameNode>> = Vec::new();
            for i in 0..len {
                // One inaccessible entry (typically a cross-origin frame)
                // is skipped; the rest of the collection is still visited.
                let mut item = VARIANT::default();
                if frames.item(&variant_i4(i), &mut item).is_err() {
                    trace!("frame collection item {} unreadable", i);
                    continue;
                }
                let Some(disp) = variant_dispatch(&item) else {
                    continue;
                };
                let Ok(window) = disp.cast::<IHTMLWindow2>() else {
                    continue;
                };
                let Ok(doc) = window.document() else {
                    trace!("frame {} document inaccessible", i);
                    continue;
                };
                children.push(Box::new(DocumentFrame { doc }));
            }
            Ok(children)
        }
    }
}

/// Enumerate all shell-hosted browser instances and their documents.
///
/// An absent shell automation service is not an error; it is an empty
/// result set.
pub(crate) fn enumerate_shell_roots() -> Vec<Box<dyn RootHandle>> {
    let mut roots: Vec<Box<dyn RootHandle>> = Vec::new();

    let shell: IShellWindows = match unsafe { CoCreateInstance(&ShellWindows, None, CLSCTX_ALL) } {
        Ok(shell) => shell,
        Err(e) => {
            debug!("shell automation service unavailable: {}", e.message());
            return roots;
        }
    };

    let count = unsafe { shell.Count() }.unwrap_or(0);
    for i in 0..count {
        let Ok(disp) = (unsafe { shell.Item(&variant_i4(i)) }) else {
            continue;
        };
        // Non-browser shell windows (plain Explorer folders) fail the cast.
        let Ok(browser) = disp.cast::<IWebBrowser2>() else {
            continue;
        };
        let Ok(doc_disp) = (unsafe { browser.Document() }) else {
            continue;
        };
        let Ok(doc) = doc_disp.cast::<IHTMLDocument2>() else {
            continue;
        };
        roots.push(Box::new(DocumentRoot { doc }));
    }

    debug!("shell discovery yielded {} root document(s)", roots.len());
    roots
}

/// Scan top-level windows of the given classes for hosted browser documents.
///
/// Each candidate gets a bounded wait of `document_timeout_ms`; a timeout or
/// failed retrieval drops that candidate only.
pub(crate) fn enumerate_window_roots(
    class_names: &[String],
    document_timeout_ms: u32,
) -> Vec<Box<dyn RootHandle>> {
    let mut roots: Vec<Box<dyn RootHandle>> = Vec::new();

    for class in class_names {
        let class_wide = to_wide(class);
        let class_pcwstr = PCWSTR::from_raw(class_wide.as_ptr());

        let mut previous: Option<HWND> = None;
        loop {
            let hwnd = match unsafe {
                FindWindowExW(None, previous, class_pcwstr, PCWSTR::null())
            } {
                Ok(hwnd) if !hwnd.is_invalid() => hwnd,
                _ => break,
            };
            previous = Some(hwnd);

            let Some(server) = find_embedded_browser(hwnd, 0) else {
                trace!("window of class '{}' hosts no embedded browser", class);
                continue;
            };
            match document_from_hwnd(server, document_timeout_ms) {
                Some(doc) => roots.push(Box::new(DocumentRoot { doc })),
                None => debug!("no document available from window of class '{}'", class),
            }
        }
    }

    debug!("native-window discovery yielded {} root document(s)", roots.len());
    roots
}

/// Breadth-limited search of a window's children for the embedded browser
/// control.
fn find_embedded_browser(parent: HWND, depth: usize) -> Option<HWND> {
    if depth >= CHILD_WINDOW_SEARCH_DEPTH {
        return None;
    }

    let mut previous: Option<HWND> = None;
    loop {
        let child = match unsafe {
            FindWindowExW(Some(parent), previous, PCWSTR::null(), PCWSTR::null())
        } {
            Ok(child) if !child.is_invalid() => child,
            _ => return None,
        };
        previous = Some(child);

        if class_name_of(child) == EMBEDDED_BROWSER_CLASS {
            return Some(child);
        }
        if let Some(found) = find_embedded_browser(child, depth + 1) {
            return Some(found);
        }
    }
}

/// Request the hosted `IHTMLDocument2` from an embedded browser window,
/// waiting at most `timeout_ms` for the process to answer.
fn document_from_hwnd(hwnd: HWND, timeout_ms: u32) -> Option<IHTMLDocument2> {
    let msg = unsafe { RegisterWindowMessageW(w!("WM_HTML_GETOBJECT")) };
    if msg == 0 {
        return None;
    }

    let mut obj: usize = 0;
    let sent = unsafe {
        SendMessageTimeoutW(
            hwnd,
            msg,
            WPARAM(0),
            LPARAM(0),
            SMTO_ABORTIFHUNG,
            timeout_ms,
            Some(&mut obj),
        )
    };
    // Zero from SendMessageTimeoutW means the wait expired or the target is
    // hung; the candidate is dropped, never escalated.
    if sent.0 == 0 || obj == 0 {
        return None;
    }

    let mut raw: *mut c_void = std::ptr::null_mut();
    unsafe {
        ObjectFromLresult(
            LRESULT(obj as isize),
            &IHTMLDocument2::IID,
            WPARAM(0),
            &mut raw,
        )
        .ok()?
    };
    if raw.is_null() {
        return None;
    }
    Some(unsafe { IHTMLDocument2::from_raw(raw) })
}

fn class_name_of(hwnd: HWND) -> String {
    let mut buf = [0u16; 256];
    let len = unsafe { GetClassNameW(hwnd, &mut buf) };
    if len <= 0 {
        return String::new();
    }
    String::from_utf16_lossy(&buf[..len as usize])
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Convert UTF-16 document text to bytes in the local ANSI code page; the
/// encoding bridge decodes them on the way out.
fn wide_to_acp(wide: &[u16]) -> Vec<u8> {
    unsafe {
        let len = WideCharToMultiByte(CP_ACP, 0, wide, None, PCSTR::null(), None);
        if len <= 0 {
            return Vec::new();
        }
        let mut buf = vec![0u8; len as usize];
        let written = WideCharToMultiByte(CP_ACP, 0, wide, Some(&mut buf), PCSTR::null(), None);
        buf.truncate(written.max(0) as usize);
        buf
    }
}

fn variant_i4(value: i32) -> VARIANT {
    let mut variant = VARIANT::default();
    unsafe {
        variant.Anonymous.Anonymous.vt = VT_I4;
        variant.Anonymous.Anonymous.Anonymous.lVal = value;
    }
    variant
}

fn variant_dispatch(variant: &VARIANT) -> Option<IDispatch> {
    unsafe {
        if variant.Anonymous.Anonymous.vt != VT_DISPATCH {
            return None;
        }
        (*variant.Anonymous.Anonymous.Anonymous.pdispVal).clone()
    }
}
