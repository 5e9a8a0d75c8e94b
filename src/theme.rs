// Markup swapped into controls while they show transient state
pub const COPIED_HTML: &str = r#"<i class="fas fa-check mr-1"></i> Copied!"#;
pub const SPINNER_HTML: &str = r#"<i class="fas fa-spinner fa-spin mr-2"></i> Loading..."#;

// Copy feedback palette
pub const SUCCESS_BG: &str = "bg-green-500";
pub const SUCCESS_HOVER_BG: &str = "hover:bg-green-600";

// URL input states
pub const INVALID_INPUT: [&str; 2] = ["border-red-500", "ring-red-500"];
pub const NEUTRAL_INPUT: [&str; 2] = ["border-gray-300", "ring-blue-500"];
pub const VALID_INPUT: &str = "border-gray-300";

// Password reveal icon
pub const ICON_MASKED: &str = "fa-eye";
pub const ICON_REVEALED: &str = "fa-eye-slash";
pub const ICON_REVEALED_COLOR: &str = "#3b82f6";

// Modal visibility
pub const HIDDEN: &str = "hidden";
pub const SHOWN_LAYOUT: &str = "flex";

pub const TOOLTIP_ID: &str = "tooltip";
pub const TOOLTIP_CLASS: &str = "absolute z-50 px-2 py-1 text-sm text-white bg-gray-900 rounded shadow-lg";

// Fade/slide transitions
pub const EASE_OUT_TRANSITION: &str = "opacity 0.5s ease-out, transform 0.5s ease-out";
pub const DISMISS_OFFSET: &str = "translateY(-10px)";
pub const ENTRANCE_OFFSET: &str = "translateY(20px)";
pub const AT_REST: &str = "translateY(0)";
