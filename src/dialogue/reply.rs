//! User-facing reply text

use crate::catalog::SupplierQuote;
use std::fmt::Write as _;

pub const GREETING: &str =
    "Olá! Sou MeliBuy, vou te ajudar a encontrar o melhor fornecedor para sua negociação.";
pub const FAREWELL: &str = "Obrigado por usar o MeliBuy! Até mais 👋";
pub const ENDED_FALLBACK: &str = "Até logo!";
pub const STATE_ERROR: &str = "Houve um erro. Por favor, reinicie a conversa.";
pub const NO_CATEGORIES_RETRY_LATER: &str =
    "Não encontrei categorias disponíveis no momento. Por favor, tente novamente mais tarde.";
pub const CATEGORY_REPROMPT: &str =
    "Não entendi sua escolha de categoria. Por favor, digite o número ou o nome da categoria que deseja.";
pub const MATERIAL_REPROMPT: &str =
    "Não entendi o insumo que você escolheu. Por favor, digite o número ou o nome do insumo na lista.";
pub const STATE_REPROMPT: &str =
    "Não consegui identificar o estado. Por favor, digite o nome completo ou a sigla do estado (Ex: SP, São Paulo).";
pub const YES_NO_REPROMPT: &str =
    "Não entendi sua resposta. Por favor, digite 'sim' para nova consulta ou 'não' para encerrar.";

const NO_CATEGORIES: &str = "Não encontrei categorias disponíveis no momento.";
const CHOOSE_CATEGORY: &str = "Por favor, escolha uma categoria:";
const FIRST_CHOOSE_CATEGORY: &str = "Para começar, por favor, escolha uma categoria:";
const ANOTHER_QUERY: &str = "🎯 Deseja fazer outra consulta? Digite 'sim' ou 'não'.";

/// Upper-case the first character and lower-case the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// `1. Item` lines, numbered from one
pub fn numbered_menu(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, capitalize(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn menu_or_empty(intro: &str, categories: &[String]) -> String {
    if categories.is_empty() {
        NO_CATEGORIES.to_string()
    } else {
        format!("{intro}\n\n{}", numbered_menu(categories))
    }
}

/// First category listing of a visit to the category step
pub fn category_prompt(greet: bool, categories: &[String]) -> String {
    let menu = format!("{FIRST_CHOOSE_CATEGORY}\n\n{}", numbered_menu(categories));
    if greet {
        format!("{GREETING}\n\n{menu}")
    } else {
        menu
    }
}

pub fn restart(categories: &[String]) -> String {
    format!(
        "Entendido! Vamos reiniciar a conversa.\n\n{}",
        menu_or_empty(CHOOSE_CATEGORY, categories)
    )
}

pub fn new_query(categories: &[String]) -> String {
    format!(
        "Certo! Vamos começar uma nova consulta.\n\n{}",
        menu_or_empty(CHOOSE_CATEGORY, categories)
    )
}

pub fn materials_menu(category: &str, materials: &[String]) -> String {
    format!(
        "Ótimo! Você escolheu a categoria '{}'. Agora, qual insumo você procura?\n\n{}",
        capitalize(category),
        numbered_menu(materials)
    )
}

pub fn no_materials(category: &str, categories: &[String]) -> String {
    format!(
        "Não encontrei insumos para a categoria '{}'. Por favor, escolha outra categoria.\n\n{}",
        capitalize(category),
        menu_or_empty(CHOOSE_CATEGORY, categories)
    )
}

pub fn state_prompt(material: &str) -> String {
    format!(
        "Você escolheu '{}'. Agora, para qual estado você precisa consultar?\nEx: SP, São Paulo, BA, Bahia, etc.",
        capitalize(material)
    )
}

fn alternatives(hints: &[&str]) -> String {
    match hints.split_last() {
        Some((last, rest)) if !rest.is_empty() => {
            let head: Vec<String> = rest.iter().map(|h| capitalize(h)).collect();
            format!("{} ou {}", head.join(", "), capitalize(last))
        }
        Some((only, _)) => capitalize(only),
        None => String::new(),
    }
}

pub fn disambiguation_prompt(region: &str, hints: &[&str]) -> String {
    format!(
        "Para {}, você se refere a {}?",
        title_case(region),
        alternatives(hints)
    )
}

pub fn disambiguation_reprompt(hints: &[&str]) -> String {
    let quoted: Vec<String> = hints.iter().map(|h| format!("'{}'", capitalize(h))).collect();
    format!(
        "Não entendi a sua especificação. Por favor, digite {}.",
        quoted.join(" ou ")
    )
}

/// "minas gerais" -> "Minas Gerais"
fn title_case(text: &str) -> String {
    text.split(' ').map(capitalize).collect::<Vec<_>>().join(" ")
}

pub fn quotes(quotes: &[SupplierQuote]) -> String {
    let mut out = String::from("Aqui estão os melhores fornecedores:\n");
    for (rank, quote) in quotes.iter().enumerate() {
        let _ = write!(
            out,
            "\n{}. {} – R$ {:.4} (Cod Forn: {}, Cod Mat: {})",
            rank + 1,
            quote.supplier,
            quote.price,
            quote.supplier_code,
            quote.material_code
        );
    }
    out.push_str("\n\n");
    out.push_str(ANOTHER_QUERY);
    out
}

pub fn no_quotes(region: &str) -> String {
    format!(
        "Nenhum fornecedor encontrado para esse insumo em {}.\n\nPor favor, tente outro estado ou diga 'reiniciar' para uma nova consulta.",
        capitalize(region)
    )
}
