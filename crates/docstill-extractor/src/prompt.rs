//! Prompt construction for the extraction and classification calls
//!
//! Pure string assembly; this module never fails and makes no network
//! calls.

use docstill_domain::ExtractionOptions;

/// Instruction used when the caller gave none
const GENERAL_REQUEST: &str =
    "Extract all key information and any repeating tabular data found in the document.";

/// Classification prompt sent before extraction when document-type
/// detection is enabled
pub const DETECTION_PROMPT: &str = "Analyze the content and layout of this document. \
What is its primary type? Examples: Invoice, Receipt, Purchase Order, Packing Slip, \
Manifest, Contract, Resume, Business Card, Email, Report, Form. \
Respond with ONLY the document type name.";

/// Builds the extraction prompt from the user instruction and options
pub struct PromptBuilder<'a> {
    instruction: &'a str,
    options: &'a ExtractionOptions,
    document_type: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(instruction: &'a str, options: &'a ExtractionOptions) -> Self {
        Self {
            instruction,
            options,
            document_type: None,
        }
    }

    /// Add a previously detected document type as context
    pub fn with_document_type(mut self, document_type: Option<&'a str>) -> Self {
        self.document_type = document_type;
        self
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Preamble, with detected type when available
        match self.document_type {
            Some(doc_type) => prompt.push_str(&format!(
                "Analyze the following document (likely a {}).\n",
                doc_type
            )),
            None => prompt.push_str("Analyze the following document.\n"),
        }
        prompt.push_str(
            "Your goal is to extract specific data based on the user's request \
             and structure it as valid JSON.\n\n",
        );

        // 2. The user's request, verbatim
        let request = if self.instruction.trim().is_empty() {
            GENERAL_REQUEST
        } else {
            self.instruction
        };
        prompt.push_str("USER'S REQUEST:\n");
        prompt.push_str(&format!("\"{}\"\n\n", request));

        // 3. The fixed rule block
        prompt.push_str("EXTRACTION & FORMATTING RULES (Follow Strictly):\n\n");
        prompt.push_str(
            "1. Scope: Extract ONLY the data fields explicitly mentioned or implied by \
             the USER'S REQUEST. If the request is general (e.g., \"extract all\"), \
             identify and extract common key fields relevant to the document type. \
             Do NOT add extra fields not requested.\n",
        );
        prompt.push_str(
            "2. JSON Output: Respond with exactly one JSON object, no surrounding prose, \
             no code fences.\n",
        );
        prompt.push_str(&format!(
            "3. Field Structure: For each extracted field, use the following JSON structure:\n   \
             \"field_name_in_snake_case\": {}\n",
            self.field_structure_example()
        ));
        if self.options.include_confidence {
            prompt.push_str(
                "   - A 'confidence' score (0.0 to 1.0) indicating certainty.\n",
            );
        }
        if self.options.include_positions {
            prompt.push_str(
                "   - 'position' data ('page_number', 'bounding_box' \
                 [x1, y1, x2, y2 percentages]) if available.\n",
            );
        }
        prompt.push_str(
            "4. REPEATING DATA - YOUR TOP PRIORITY: repeating data (line items, rows, \
             transactions) must be an array of objects, one object per record, NEVER a \
             delimited string.\n   \
             ABSOLUTELY FORBIDDEN: \"line_items\": { \"value\": \"item1, item2, item3\" }\n   \
             ALWAYS REQUIRED: \"line_items\": [ {object1}, {object2}, {object3} ]\n   \
             If you see multiple products like \"123456 - PRODUCT NAME\", split each into \
             its own object with 'product_code' and 'description' fields.\n",
        );
        prompt.push_str(&format!(
            "5. Not Found: If a specifically requested field cannot be found, include its \
             key with a value of null{} rather than omitting it:\n   \
             \"requested_but_missing_field\": {{ \"value\": null{} }}\n",
            if self.options.include_confidence {
                " and a low confidence score (0.1)"
            } else {
                ""
            },
            if self.options.include_confidence {
                ", \"confidence\": 0.1"
            } else {
                ""
            },
        ));
        prompt.push_str(
            "6. Hierarchy: If the data has a natural hierarchy (e.g., sender address with \
             street, city, zip), represent it using nested JSON objects.\n",
        );

        prompt.push_str(
            "\nNow, analyze the document and provide the extracted data according to the \
             USER'S REQUEST and these rules.",
        );

        prompt
    }

    /// Example scalar structure, adapted to the enabled options
    fn field_structure_example(&self) -> String {
        let mut example = String::from("{ \"value\": \"extracted value\"");
        if self.options.include_confidence {
            example.push_str(", \"confidence\": 0.95");
        }
        if self.options.include_positions {
            example.push_str(
                ", \"position\": { \"page_number\": 1, \
                 \"bounding_box\": [10.5, 20.3, 30.2, 25.1] }",
            );
        }
        example.push_str(" }");
        example
    }
}
