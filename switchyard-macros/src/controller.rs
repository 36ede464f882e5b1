//! `#[controller]` - target metadata and member dispatch for an impl block.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    FnArg, GenericArgument, Ident, ImplItem, ImplItemFn, ItemImpl, LitStr, Pat, PathArguments,
    ReturnType, Token, Type, Visibility,
    ext::IdentExt,
    parse::{Parse, ParseStream},
    parse_macro_input,
};

/// Arguments for the `#[controller]` macro.
pub(crate) struct ControllerArgs {
    pub name: Option<String>,
    pub output: Option<Type>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut name = None;
        let mut output = None;

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "name" => {
                    let lit: LitStr = input.parse()?;
                    name = Some(lit.value());
                }
                "output" => {
                    let ty: Type = input.parse()?;
                    output = Some(ty);
                }
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ControllerArgs { name, output })
    }
}

/// Arguments of a `#[param(...)]` attribute.
#[derive(Default)]
struct ParamArgs {
    default: Option<LitStr>,
    regex: Option<LitStr>,
}

impl Parse for ParamArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = ParamArgs::default();

        while !input.is_empty() {
            let ident: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match ident.to_string().as_str() {
                "default" => args.default = Some(input.parse()?),
                "regex" => args.regex = Some(input.parse()?),
                other => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown param attribute: {}", other),
                    ));
                }
            }

            if input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(args)
    }
}

enum Returns {
    Unit,
    Plain(Type),
    Fallible(Type),
}

struct Param {
    name: String,
    ty: Type,
    option_of: Option<Type>,
    args: ParamArgs,
}

struct OperationDef {
    ident: Ident,
    params: Vec<Param>,
    returns: Returns,
}

/// Implementation of the `#[controller]` macro.
pub fn controller_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(attr as ControllerArgs);
    let mut input = parse_macro_input!(item as ItemImpl);

    match expand(&args, &mut input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: &ControllerArgs, input: &mut ItemImpl) -> syn::Result<TokenStream2> {
    if let Some((_, path, _)) = &input.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[controller] must be placed on an inherent impl block",
        ));
    }

    let target_name = match &args.name {
        Some(name) => name.clone(),
        None => type_name(&input.self_ty)?,
    };

    let mut operations = Vec::new();
    for item in &mut input.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let params = take_params(method)?;
        if is_operation(method) {
            operations.push(OperationDef {
                ident: method.sig.ident.clone(),
                params,
                returns: returns(&method.sig.output),
            });
        }
    }

    let output = match (&args.output, operations.first()) {
        (Some(ty), _) => quote! { #ty },
        (None, Some(first)) => match &first.returns {
            Returns::Unit => quote! { () },
            Returns::Plain(ty) | Returns::Fallible(ty) => quote! { #ty },
        },
        (None, None) => {
            return Err(syn::Error::new_spanned(
                &input.self_ty,
                "#[controller] found no `pub fn` taking `&self`; add one or set `output = Type`",
            ));
        }
    };

    let operation_defs = operations.iter().map(operation_def);
    let arms = operations.iter().map(call_arm);

    let self_ty = &input.self_ty;
    let (impl_generics, _, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        #input

        impl #impl_generics ::switchyard::Controller<#output> for #self_ty #where_clause {
            fn name(&self) -> &str {
                #target_name
            }

            fn operations(&self) -> &[::switchyard::Operation] {
                static OPERATIONS: ::std::sync::OnceLock<::std::vec::Vec<::switchyard::Operation>> =
                    ::std::sync::OnceLock::new();
                OPERATIONS.get_or_init(|| ::std::vec![#(#operation_defs),*])
            }

            #[allow(unused_variables)]
            fn call(
                &self,
                __member: &str,
                __args: ::switchyard::Args,
            ) -> ::core::result::Result<#output, ::switchyard::BoxError> {
                match __member {
                    #(#arms)*
                    _ => ::core::result::Result::Err(
                        ::std::format!("`{}` has no operation `{}`", #target_name, __member).into(),
                    ),
                }
            }
        }
    })
}

fn type_name(ty: &Type) -> syn::Result<String> {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.unraw().to_string())
            .ok_or_else(|| syn::Error::new_spanned(ty, "expected a named type")),
        _ => Err(syn::Error::new_spanned(
            ty,
            "#[controller] needs a named type; set `name = \"...\"`",
        )),
    }
}

fn is_operation(method: &ImplItemFn) -> bool {
    let public = matches!(method.vis, Visibility::Public(_));
    let by_ref = matches!(
        method.sig.inputs.first(),
        Some(FnArg::Receiver(receiver)) if receiver.reference.is_some() && receiver.mutability.is_none()
    );
    public && by_ref
}

/// Collect parameter metadata and strip the `#[param]` attributes.
fn take_params(method: &mut ImplItemFn) -> syn::Result<Vec<Param>> {
    let mut params = Vec::new();
    for input in method.sig.inputs.iter_mut() {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };

        let mut args = ParamArgs::default();
        let mut kept = Vec::with_capacity(pat_type.attrs.len());
        for attr in pat_type.attrs.drain(..) {
            if attr.path().is_ident("param") {
                let parsed: ParamArgs = attr.parse_args()?;
                args.default = parsed.default.or(args.default);
                args.regex = parsed.regex.or(args.regex);
            } else {
                kept.push(attr);
            }
        }
        pat_type.attrs = kept;

        let name = match &*pat_type.pat {
            Pat::Ident(pat) => pat.ident.unraw().to_string(),
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "operation parameters must be plain identifiers",
                ));
            }
        };

        let ty = (*pat_type.ty).clone();
        params.push(Param {
            name,
            option_of: option_of(&ty),
            ty,
            args,
        });
    }
    Ok(params)
}

fn option_of(ty: &Type) -> Option<Type> {
    generic_arg(ty, "Option")
}

fn generic_arg(ty: &Type, wrapper: &str) -> Option<Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty.clone()),
        _ => None,
    })
}

fn returns(output: &ReturnType) -> Returns {
    match output {
        ReturnType::Default => Returns::Unit,
        ReturnType::Type(_, ty) => match generic_arg(ty, "Result") {
            Some(ok) => Returns::Fallible(ok),
            None => Returns::Plain((**ty).clone()),
        },
    }
}

/// Constraint derived from a parameter's type: digits for integers, a word
/// for `String`.
fn type_constraint(ty: &Type) -> Option<&'static str> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if !segment.arguments.is_empty() {
        return None;
    }
    match segment.ident.to_string().as_str() {
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => Some("[0-9]+"),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => Some("-?[0-9]+"),
        "String" => Some("\\w+"),
        _ => None,
    }
}

fn operation_def(op: &OperationDef) -> TokenStream2 {
    let name = op.ident.unraw().to_string();
    let specs = op.params.iter().map(|param| {
        let param_name = &param.name;
        let spec = match (&param.args.default, &param.option_of) {
            (Some(default), _) => quote! { ::switchyard::ParamSpec::with_default(#param_name, #default) },
            (None, Some(_)) => quote! { ::switchyard::ParamSpec::optional(#param_name) },
            (None, None) => quote! { ::switchyard::ParamSpec::required(#param_name) },
        };

        let value_ty = param.option_of.as_ref().unwrap_or(&param.ty);
        let constraint = match &param.args.regex {
            Some(regex) => Some(regex.value()),
            None => type_constraint(value_ty).map(str::to_string),
        };
        match constraint {
            Some(regex) => quote! { #spec.constraint(#regex) },
            None => spec,
        }
    });

    quote! {
        ::switchyard::Operation::new(#name, ::switchyard::Signature::new(::std::vec![#(#specs),*]))
    }
}

fn call_arm(op: &OperationDef) -> TokenStream2 {
    let ident = &op.ident;
    let name = ident.unraw().to_string();
    let values = op.params.iter().enumerate().map(|(i, param)| match &param.option_of {
        Some(inner) => quote! { __args.optional::<#inner>(#i)? },
        None => {
            let ty = &param.ty;
            quote! { __args.required::<#ty>(#i)? }
        }
    });

    let call = quote! { self.#ident(#(#values),*) };
    let body = match op.returns {
        Returns::Unit => quote! {
            #call;
            ::core::result::Result::Ok(())
        },
        Returns::Plain(_) => quote! { ::core::result::Result::Ok(#call) },
        Returns::Fallible(_) => quote! {
            #call.map_err(::core::convert::Into::into)
        },
    };

    quote! {
        #name => { #body }
    }
}
