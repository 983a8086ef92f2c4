//! CineFlow tool definitions for the AI agent.
//!
//! Every tool adds one asset to the canvas. `x`/`y` are optional; the agent
//! lays assets out in a cascade when the model leaves them out.

use super::types::Tool;

/// Build the set of tools available to the CineFlow agent.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn cineflow_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "createCharacter".into(),
            description: "Add a character card to the canvas with a name and a short profile.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Character name, used as the card title" },
                    "description": { "type": "string", "description": "Appearance, personality, and role in the story" },
                    "x": { "type": "number", "description": "X position on canvas" },
                    "y": { "type": "number", "description": "Y position on canvas" }
                },
                "required": ["name", "description"]
            }),
        },
        Tool {
            name: "createScene".into(),
            description: "Add a scene card describing setting, action, and mood.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Scene heading, e.g. INT. DINER - NIGHT" },
                    "description": { "type": "string", "description": "What happens in the scene" },
                    "x": { "type": "number", "description": "X position on canvas" },
                    "y": { "type": "number", "description": "Y position on canvas" }
                },
                "required": ["title", "description"]
            }),
        },
        Tool {
            name: "createText".into(),
            description: "Add a free text note (script excerpt, outline, ideas).".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Short label for the note" },
                    "text": { "type": "string", "description": "Body of the note" },
                    "x": { "type": "number", "description": "X position on canvas" },
                    "y": { "type": "number", "description": "Y position on canvas" }
                },
                "required": ["text"]
            }),
        },
        Tool {
            name: "generateImage".into(),
            description: "Generate a still image (storyboard frame, concept art) and add it to the canvas.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "prompt": { "type": "string", "description": "Visual description of the image" },
                    "title": { "type": "string", "description": "Label for the image asset" },
                    "useContextImage": {
                        "type": "boolean",
                        "description": "Use the first image in the user's context as a reference"
                    },
                    "x": { "type": "number", "description": "X position on canvas" },
                    "y": { "type": "number", "description": "Y position on canvas" }
                },
                "required": ["prompt"]
            }),
        },
        Tool {
            name: "generateVideo".into(),
            description: "Generate a short 16:9 video clip and add it to the canvas. Slow; use sparingly.".into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "prompt": { "type": "string", "description": "Shot description: subject, camera move, mood" },
                    "title": { "type": "string", "description": "Label for the video asset" },
                    "useContextImage": {
                        "type": "boolean",
                        "description": "Animate the first image in the user's context"
                    },
                    "x": { "type": "number", "description": "X position on canvas" },
                    "y": { "type": "number", "description": "Y position on canvas" }
                },
                "required": ["prompt"]
            }),
        },
    ]
}

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;
