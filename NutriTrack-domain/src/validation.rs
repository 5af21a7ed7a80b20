use validator::{Validate, ValidationErrors};

/// Flatten validator field errors into one display message, fields in
/// alphabetical order
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    fields
        .into_iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ")
}

/// Run `validate()` and turn failures into a display message
pub fn validate_request<T: Validate>(request: &T) -> Result<(), String> {
    request.validate().map_err(|e| describe_validation_errors(&e))
}
