use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    /// Fill colors assigned to phases by declaration index, wrapping around.
    pub phase_colors: Vec<String>,
    pub text_color: String,
    pub node_border_color: String,
    pub internal_edge_color: String,
    pub transition_edge_color: String,
    pub boundary_color: String,
    pub selected_color: String,
    pub edge_label_background: String,
    pub edge_label_border: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "DejaVu Sans, Verdana, Arial, sans-serif".to_string(),
            font_size: 12.0,
            phase_colors: ["lightblue", "lightgreen", "lightyellow", "lightpink", "lightcoral"]
                .iter()
                .map(|color| color.to_string())
                .collect(),
            text_color: "#000000".to_string(),
            node_border_color: "#000000".to_string(),
            internal_edge_color: "#000000".to_string(),
            transition_edge_color: "#FF0000".to_string(),
            boundary_color: "#808080".to_string(),
            selected_color: "orange".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            edge_label_border: "#808080".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            phase_colors: ["#DCEBFF", "#DDF5E3", "#FFF6D6", "#FBE1EC", "#FDE2DA", "#E9E3FB"]
                .iter()
                .map(|color| color.to_string())
                .collect(),
            text_color: "#1C2430".to_string(),
            node_border_color: "#4A5568".to_string(),
            internal_edge_color: "#4A5568".to_string(),
            transition_edge_color: "#D64545".to_string(),
            boundary_color: "#A0AEC0".to_string(),
            selected_color: "#F6AD55".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            edge_label_border: "#CBD5E0".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn phase_color(&self, phase_index: usize) -> &str {
        if self.phase_colors.is_empty() {
            return "lightgray";
        }
        &self.phase_colors[phase_index % self.phase_colors.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
