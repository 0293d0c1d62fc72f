use crate::components::ui::{
    Button, Card, CardContent, CardDescription, CardHeader, CardItem, CardList, CardTitle, Spinner,
    Textarea,
};
use crate::format::{char_count, toggle_marker, word_count, FormatEdit, Marker};
use crate::state::autosave::AutosaveController;
use crate::state::AppContext;
use icons::{Bold, CircleCheck, Italic, Save};
use leptos::html;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

/// The editor widget page.
///
/// One configurable component instead of parallel variants: `with_formatting`
/// decides whether the bold/italic toolbar renders; autosave behavior is
/// identical either way.
#[component]
pub fn EditorPage(#[prop(default = true)] with_formatting: bool) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let autosave = AutosaveController::new(app_state.clone());

    let textarea_ref: NodeRef<html::Textarea> = NodeRef::new();

    let text = autosave.text;
    let saved = autosave.saved;
    let just_saved = autosave.just_saved;
    let snapshots = app_state.0.snapshots;
    let snapshots_loading = app_state.0.snapshots_loading;

    // Populate the feed on mount; successful saves re-run it.
    let autosave_mount = autosave.clone();
    Effect::new(move |_| {
        autosave_mount.refresh_snapshots();
    });

    // StoredValue gives the event closures a Copy handle on the controller.
    let autosave_sv = StoredValue::new(autosave);

    let apply_marker = move |marker: Marker| {
        let Some(el) = textarea_ref.get_untracked() else {
            return;
        };

        // selectionStart/End are in UTF-16 code units.
        let start = el.selection_start().ok().flatten().unwrap_or(0);
        let end = el.selection_end().ok().flatten().unwrap_or(start);

        let autosave = autosave_sv.get_value();
        let FormatEdit {
            text: new_text,
            sel_start,
            sel_end,
        } = toggle_marker(&autosave.text.get_untracked(), start, end, marker);

        autosave.on_edit(new_text);

        // Restore focus and the shifted selection on next tick, after the new
        // value has been written to the DOM.
        let _ = web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                wasm_bindgen::closure::Closure::once_into_js(move || {
                    let _ = el.focus();
                    let _ = el.set_selection_range(sel_start, sel_end);
                })
                .as_ref()
                .unchecked_ref(),
                0,
            );
    };

    let on_text_input = Callback::new(move |_new_text: String| {
        // The textarea already wrote into the bound signal; just rearm.
        autosave_sv.get_value().mark_dirty();
    });

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-4xl px-4 py-8">
                <Card>
                    <CardHeader class="w-full">
                        <CardTitle class="flex w-full items-center justify-between">
                            <span>"Draftpad"</span>
                            <Show
                                when=move || saved.get()
                                fallback=|| view! {
                                    <span class="flex items-center text-sm font-normal text-yellow-500">
                                        <Save class="mr-2 size-4" />
                                        "Saving..."
                                    </span>
                                }
                            >
                                <span class="flex items-center text-sm font-normal text-green-500">
                                    <CircleCheck class="mr-2 size-4" />
                                    "Saved"
                                </span>
                            </Show>
                        </CardTitle>
                        <CardDescription>
                            "Your draft is saved automatically after a short pause in typing."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <div class="relative">
                            <Show when=move || with_formatting fallback=|| ().into_view()>
                                <div class="mb-2 flex items-center gap-2">
                                    <Button
                                        class="h-8 border bg-transparent px-2.5 text-muted-foreground hover:bg-accent hover:text-accent-foreground"
                                        attr:aria-label="Bold"
                                        on:click=move |_| apply_marker(Marker::Bold)
                                    >
                                        <Bold class="size-4" />
                                    </Button>
                                    <Button
                                        class="h-8 border bg-transparent px-2.5 text-muted-foreground hover:bg-accent hover:text-accent-foreground"
                                        attr:aria-label="Italic"
                                        on:click=move |_| apply_marker(Marker::Italic)
                                    >
                                        <Italic class="size-4" />
                                    </Button>
                                </div>
                            </Show>

                            <Textarea
                                id="draft"
                                class="min-h-[300px] resize-none md:min-h-[400px]"
                                placeholder="Start typing here..."
                                bind_value=text
                                on_value_change=on_text_input
                                node_ref=textarea_ref
                            />

                            <div class="mt-2 text-sm text-muted-foreground">
                                {move || {
                                    let t = text.get();
                                    format!("Words: {} | Characters: {}", word_count(&t), char_count(&t))
                                }}
                            </div>

                            <Show when=move || just_saved.get() fallback=|| ().into_view()>
                                <div class="absolute bottom-4 right-4 rounded-md bg-green-500 px-4 py-2 text-white shadow-lg">
                                    "Text saved successfully!"
                                </div>
                            </Show>
                        </div>

                        <div class="mt-6">
                            <h3 class="flex items-center gap-2 text-lg font-semibold">
                                "Saved snapshots"
                                <Show when=move || snapshots_loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                            </h3>

                            <Show
                                when=move || !snapshots.get().is_empty()
                                fallback=move || view! {
                                    <div class="mt-2 text-xs text-muted-foreground">
                                        {move || if snapshots_loading.get() {
                                            "Loading snapshots..."
                                        } else {
                                            "Nothing saved yet."
                                        }}
                                    </div>
                                }
                            >
                                <CardList class="mt-2">
                                    {move || {
                                        snapshots
                                            .get()
                                            .into_iter()
                                            .map(|rec| {
                                                view! {
                                                    <CardItem class="rounded-md border bg-muted/30 px-4 py-3">
                                                        <pre class="whitespace-pre-wrap text-sm text-foreground">{rec.content}</pre>
                                                    </CardItem>
                                                }
                                            })
                                            .collect_view()
                                    }}
                                </CardList>
                            </Show>
                        </div>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}
