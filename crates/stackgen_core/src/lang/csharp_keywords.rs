//! C# keyword vocabulary (for codegen identifier escaping).

/// Reserved keywords in C#. Contextual keywords (`var`, `async`, `value`, ...) are legal identifiers and omitted.
pub const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked", "class", "const",
    "continue", "decimal", "default", "delegate", "do", "double", "else", "enum", "event", "explicit", "extern",
    "false", "finally", "fixed", "float", "for", "foreach", "goto", "if", "implicit", "in", "int", "interface",
    "internal", "is", "lock", "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short", "sizeof", "stackalloc",
    "static", "string", "struct", "switch", "this", "throw", "true", "try", "typeof", "uint", "ulong", "unchecked",
    "unsafe", "ushort", "using", "virtual", "void", "volatile", "while",
];

/// Check whether an identifier is a reserved C# keyword.
pub fn is_keyword(name: &str) -> bool {
    CSHARP_KEYWORDS.contains(&name)
}
