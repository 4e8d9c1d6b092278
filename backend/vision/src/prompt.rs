/// Fixed role and output contract for the vision model.
pub const SYSTEM_PROMPT: &str = "You are ShipCheckAI. Analyze a single photo from a vessel inspection. \
Output strict JSON with fields: status(one of GREEN,YELLOW,RED), \
description, recommendation. Use maritime safety best practices (SOLAS/ISM). \
Be concise and actionable.";

pub const USER_INSTRUCTION: &str = "Analyze this photo and respond with the JSON.";

/// Uploads are always declared as JPEG, whatever their real format.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

pub const TEMPERATURE: f32 = 0.2;
