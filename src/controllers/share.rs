//! Sharing a short link and saving generated content.

use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::controllers::clipboard::copy_to_clipboard;
use crate::page::{Page, PageError, ShareData};

pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Opens the native share sheet, or copies the content when there is none.
///
/// A rejected or cancelled share is only logged; the clipboard fallback is for
/// browsers without the capability, not for users who dismissed the sheet.
pub fn share_content<P: Page>(page: &Rc<P>, data: ShareData) {
    match page.share(&data) {
        Some(share) => page.spawn(
            async move {
                match share.await {
                    Ok(()) => debug!(url = %data.url, "shared"),
                    Err(e) => info!("Error sharing: {}", e),
                }
            }
            .boxed_local(),
        ),
        None => {
            copy_to_clipboard(page, &data.as_clipboard_text(), None, Duration::ZERO);
            page.alert("Content copied to clipboard!");
        }
    }
}

/// Hands `content` to the browser's save flow as `filename`.
///
/// The temporary anchor and object URL never outlive the call.
pub fn download_file<P: Page>(page: &P, content: &str, filename: &str, content_type: &str) -> Result<(), PageError> {
    let url = page.create_object_url(content, content_type)?;
    let result = click_download_link(page, &url, filename);
    page.revoke_object_url(&url);

    if let Err(e) = &result {
        warn!(filename, %e, "download failed");
    }
    result
}

fn click_download_link<P: Page>(page: &P, url: &str, filename: &str) -> Result<(), PageError> {
    let anchor = page.create_element("a")?;
    page.set_attribute(&anchor, "href", url)?;
    page.set_attribute(&anchor, "download", filename)?;
    page.append_to_body(&anchor)?;
    page.click(&anchor);
    page.remove(&anchor);
    Ok(())
}
