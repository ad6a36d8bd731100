//! Symbol id assignment
//!
//! Gives every declared variable a unique nonzero id and stamps that id on
//! each later reference. Scoping is brace-based; parameters and `for`
//! initializers are held as pending until the next `{` opens their scope.

use std::collections::HashMap;

use log::trace;

use crate::token::{is_keyword, is_non_type_keyword, Token, TokenKind};

/// Tokens that may follow the name in a declaration
const DECLARATOR_END: &[&str] = &[";", "=", "[", ",", ")"];

/// Tokens that may precede the type of a declaration
const DECLARATION_START: &[&str] = &[";", "{", "}", "(", ",", ":"];

const TAG_KEYWORDS: &[&str] = &["struct", "union", "enum", "class"];

#[derive(Default)]
struct SymbolScopes {
    scopes: Vec<HashMap<String, u32>>,
    pending: Vec<(String, u32)>,
    next_id: u32,
}

impl SymbolScopes {
    fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
            pending: Vec::new(),
            next_id: 1,
        }
    }

    fn lookup(&self, name: &str) -> Option<u32> {
        if let Some((_, id)) = self.pending.iter().rev().find(|(n, _)| n == name) {
            return Some(*id);
        }
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn declare(&mut self, name: &str, as_pending: bool) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        if as_pending {
            self.pending.push((name.to_string(), id));
        } else if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), id);
        }
        id
    }

    fn open_scope(&mut self) {
        let mut scope = HashMap::new();
        for (name, id) in self.pending.drain(..) {
            scope.insert(name, id);
        }
        self.scopes.push(scope);
    }

    fn close_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }
}

/// Identifier that may spell (part of) a type in the current scope
fn is_type_like(token: &Token, scopes: &SymbolScopes) -> bool {
    token.kind == TokenKind::Name
        && !is_non_type_keyword(&token.text)
        && !matches!(token.text.as_str(), "if" | "while" | "for" | "switch" | "typedef")
        && (is_keyword(&token.text) || scopes.lookup(&token.text).is_none())
}

/// Decide whether the name at `index` is being declared
fn is_declaration(tokens: &[Token], index: usize, scopes: &SymbolScopes) -> bool {
    let token = &tokens[index];
    if token.kind != TokenKind::Name || is_keyword(&token.text) {
        return false;
    }
    if !tokens
        .get(index + 1)
        .is_some_and(|next| DECLARATOR_END.contains(&next.text.as_str()))
    {
        return false;
    }

    let mut k = index;
    while k > 0 && matches!(tokens[k - 1].text.as_str(), "*" | "&" | "&&" | "const" | "volatile") {
        k -= 1;
    }
    if k == 0 || !is_type_like(&tokens[k - 1], scopes) {
        return false;
    }
    if TAG_KEYWORDS.contains(&tokens[k - 1].text.as_str()) {
        return false;
    }

    // Walk back over the rest of the type, e.g. `static unsigned int`, `std :: string`
    k -= 1;
    while k > 0 {
        let prev = &tokens[k - 1];
        if prev.is("::") && k >= 2 && tokens[k - 2].kind == TokenKind::Name {
            k -= 2;
        } else if is_type_like(prev, scopes) {
            k -= 1;
        } else {
            break;
        }
    }

    k == 0 || DECLARATION_START.contains(&tokens[k - 1].text.as_str())
}

/// Assign symbol ids in place
pub fn assign_var_ids(tokens: &mut [Token]) {
    let mut scopes = SymbolScopes::new();
    let mut paren_depth = 0usize;

    for index in 0..tokens.len() {
        match tokens[index].text.as_str() {
            "{" => {
                scopes.open_scope();
                paren_depth = 0;
                continue;
            }
            "}" => {
                scopes.close_scope();
                continue;
            }
            "(" => {
                paren_depth += 1;
                continue;
            }
            ")" => {
                paren_depth = paren_depth.saturating_sub(1);
                continue;
            }
            ";" if paren_depth == 0 => {
                // A prototype ends without a body: drop its parameters
                scopes.pending.clear();
                continue;
            }
            _ => {}
        }

        if tokens[index].kind != TokenKind::Name {
            continue;
        }
        if index > 0 && matches!(tokens[index - 1].text.as_str(), "." | "->") {
            continue;
        }

        let var_id = if is_declaration(tokens, index, &scopes) {
            let id = scopes.declare(&tokens[index].text, paren_depth > 0);
            trace!(
                "declared `{}` as symbol {} at line {}",
                tokens[index].text,
                id,
                tokens[index].line
            );
            id
        } else {
            match scopes.lookup(&tokens[index].text) {
                Some(id) => id,
                None => continue,
            }
        };
        tokens[index].var_id = var_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn ids(source: &str) -> Vec<(String, u32)> {
        let mut tokens = lex(source).unwrap();
        assign_var_ids(&mut tokens);
        tokens
            .into_iter()
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| (t.text, t.var_id))
            .collect()
    }

    fn id_of(ids: &[(String, u32)], name: &str, nth: usize) -> u32 {
        ids.iter()
            .filter(|(n, _)| n == name)
            .nth(nth)
            .map(|(_, id)| *id)
            .unwrap()
    }

    #[test]
    fn test_locals_and_references_share_ids() {
        let ids = ids("void f() { int x; x = 1; g(x); }");
        let first = id_of(&ids, "x", 0);
        assert_ne!(first, 0);
        assert_eq!(id_of(&ids, "x", 1), first);
        assert_eq!(id_of(&ids, "x", 2), first);
        assert_eq!(id_of(&ids, "f", 0), 0);
        assert_eq!(id_of(&ids, "g", 0), 0);
        assert_eq!(id_of(&ids, "int", 0), 0);
    }

    #[test]
    fn test_parameters_scope_to_body() {
        let ids = ids("int f(int **pp) { *pp = 0; } void g() { pp = 0; }");
        let param = id_of(&ids, "pp", 0);
        assert_ne!(param, 0);
        assert_eq!(id_of(&ids, "pp", 1), param);
        assert_eq!(id_of(&ids, "pp", 2), 0);
    }

    #[test]
    fn test_prototype_parameters_are_dropped() {
        let ids = ids("int f(int a); void g() { a = 1; }");
        assert_ne!(id_of(&ids, "a", 0), 0);
        assert_eq!(id_of(&ids, "a", 1), 0);
    }

    #[test]
    fn test_same_name_in_two_functions_gets_distinct_ids() {
        let ids = ids("void a() { int x; } void b() { int x; x = 2; }");
        let in_a = id_of(&ids, "x", 0);
        let in_b = id_of(&ids, "x", 1);
        assert_ne!(in_a, in_b);
        assert_eq!(id_of(&ids, "x", 2), in_b);
    }

    #[test]
    fn test_arrays_pointers_and_storage() {
        let ids = ids("void f() { extern int e; static char *s; int a[5]; free(a); }");
        assert_ne!(id_of(&ids, "e", 0), 0);
        assert_ne!(id_of(&ids, "s", 0), 0);
        let a = id_of(&ids, "a", 0);
        assert_ne!(a, 0);
        assert_eq!(id_of(&ids, "a", 1), a);
    }

    #[test]
    fn test_multiplication_is_not_a_declaration() {
        let ids = ids("void f(int a, int b) { a * b; }");
        let a = id_of(&ids, "a", 0);
        let b = id_of(&ids, "b", 0);
        assert_eq!(id_of(&ids, "a", 1), a);
        assert_eq!(id_of(&ids, "b", 1), b);
    }

    #[test]
    fn test_members_and_struct_tags_have_no_id() {
        let ids = ids("struct S; void f() { struct S *p; p->next = 0; }");
        assert_eq!(id_of(&ids, "S", 0), 0);
        assert_eq!(id_of(&ids, "S", 1), 0);
        assert_ne!(id_of(&ids, "p", 0), 0);
        assert_eq!(id_of(&ids, "next", 0), 0);
    }
}
